//! Analytics services - Statistiche in sola lettura sui risultati dei quiz
//!
//! Tutte le percentuali sono `corrette / totali * 100` arrotondate a due
//! decimali, 0 se non ci sono domande. Le medie giornaliere sommano prima
//! risposte e domande del giorno e poi dividono.

use super::access::{load_organization, require_manager};
use crate::core::{AppError, AppState};
use crate::dtos::{
    DailyScoreDTO, DateRangeQuery, DynamicScoreDTO, DynamicScoresQuery, ExportFormat,
    ExportOrganizationResultsQuery, ExportResultQuery, LastCompletionDTO, MyLastCompletionDTO,
    OrganizationQuery, OrganizationScoreDTO, ResultExportDTO, UserQuery, UserRatingDTO,
};
use crate::entities::{User, percentage};
use crate::repositories::{DailyTotals, Read};
use axum::{
    Extension,
    extract::{Json, Query, State, rejection::QueryRejection},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Raggruppa righe ordinate per (id, giorno) in una serie per id
pub fn build_series(rows: Vec<DailyTotals>) -> Vec<DynamicScoreDTO> {
    let mut series: Vec<DynamicScoreDTO> = Vec::new();

    for row in rows {
        let point = DailyScoreDTO {
            day: row.day,
            average_score: percentage(row.correct, row.total),
        };
        match series.last_mut() {
            Some(current) if current.id == row.id => current.dynamic_time.push(point),
            _ => series.push(DynamicScoreDTO {
                id: row.id,
                dynamic_time: vec![point],
            }),
        }
    }

    series
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn organization_score(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> Result<Json<OrganizationScoreDTO>, AppError> {
    let Query(query) = query?;
    load_organization(&state, query.organization).await?;

    let totals = state
        .result
        .totals_in_organization(current_user.user_id, query.organization)
        .await?;

    Ok(Json(OrganizationScoreDTO {
        organization: query.organization,
        user: current_user.user_id,
        average_score: percentage(totals.correct, totals.total),
    }))
}

#[instrument(skip(state, query))]
pub async fn user_rating(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserRatingDTO>, AppError> {
    let Query(query) = query?;
    if state.user.read(&query.user).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let totals = state.result.totals_for_user(query.user).await?;
    Ok(Json(UserRatingDTO {
        user: query.user,
        average_score: percentage(totals.correct, totals.total),
    }))
}

/// Serie per utente, oppure per quiz quando è indicato `user`
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn dynamic_scores(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<DynamicScoresQuery>, QueryRejection>,
) -> Result<Json<Vec<DynamicScoreDTO>>, AppError> {
    let Query(query) = query?;
    let organization = load_organization(&state, query.organization).await?;
    require_manager(&state, current_user.user_id, query.organization).await?;

    let start = query
        .start_date
        .unwrap_or_else(|| organization.created_at.date_naive());
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    if start > end {
        return Err(AppError::bad_request("start_date must not be after end_date"));
    }

    let rows = match query.user {
        Some(user_id) => {
            state
                .result
                .daily_by_quiz(query.organization, user_id, start, end)
                .await?
        }
        None => {
            state
                .result
                .daily_by_user(query.organization, start, end)
                .await?
        }
    };

    debug!("Aggregating {} daily rows", rows.len());
    Ok(Json(build_series(rows)))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn my_dynamic_scores(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<DailyScoreDTO>>, AppError> {
    let Query(query) = query?;
    let start = query
        .start_date
        .unwrap_or_else(|| current_user.created_at.date_naive());
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    if start > end {
        return Err(AppError::bad_request("start_date must not be after end_date"));
    }

    let rows = state
        .result
        .daily_for_user(current_user.user_id, start, end)
        .await?;

    let series = build_series(rows)
        .into_iter()
        .next()
        .map(|s| s.dynamic_time)
        .unwrap_or_default();
    Ok(Json(series))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn quiz_last_completions(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> Result<Json<Vec<LastCompletionDTO>>, AppError> {
    let Query(query) = query?;
    load_organization(&state, query.organization).await?;
    require_manager(&state, current_user.user_id, query.organization).await?;

    let completions = state
        .result
        .last_completions_in_organization(query.organization)
        .await?;
    Ok(Json(completions))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn my_last_completions(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<MyLastCompletionDTO>>, AppError> {
    let completions = state
        .result
        .last_completions_for_user(current_user.user_id)
        .await?;
    Ok(Json(completions))
}

/// Serializza le righe nel formato richiesto; il CSV ha una riga di intestazione
pub fn render_export(
    rows: &[ResultExportDTO],
    format: ExportFormat,
) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Json => serde_json::to_vec(rows).map_err(|e| {
            AppError::internal_server_error("Failed to export results").with_details(e.to_string())
        }),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in rows {
                writer.serialize(row).map_err(|e| {
                    AppError::internal_server_error("Failed to export results")
                        .with_details(e.to_string())
                })?;
            }
            writer.into_inner().map_err(|e| {
                AppError::internal_server_error("Failed to export results")
                    .with_details(e.to_string())
            })
        }
    }
}

fn attachment(
    rows: &[ResultExportDTO],
    format: ExportFormat,
) -> Result<impl IntoResponse + use<>, AppError> {
    let body = render_export(rows, format)?;
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type()),
            (header::CONTENT_DISPOSITION, format.content_disposition()),
        ],
        body,
    ))
}

/// Ultimo risultato del chiamante per un quiz, come file scaricabile
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn export_result(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<ExportResultQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    state
        .quiz
        .read(&query.quiz)
        .await?
        .ok_or_else(|| AppError::not_found("Quiz not found"))?;

    let row = state
        .result
        .latest_for_export(current_user.user_id, query.quiz)
        .await?
        .ok_or_else(|| AppError::not_found("Result not found"))?;

    info!("Exporting result {} as {:?}", row.id, query.file_type);
    attachment(&[ResultExportDTO::from(row)], query.file_type)
}

/// Risultati dell'organizzazione per admin e owner, opzionalmente filtrati per utente
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn export_organization_results(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<ExportOrganizationResultsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    load_organization(&state, query.organization).await?;
    require_manager(&state, current_user.user_id, query.organization).await?;

    let rows: Vec<ResultExportDTO> = state
        .result
        .organization_for_export(query.organization, query.user)
        .await?
        .into_iter()
        .map(ResultExportDTO::from)
        .collect();
    if rows.is_empty() {
        return Err(AppError::not_found("Results not found"));
    }

    info!(
        "Exporting {} results of organization {} as {:?}",
        rows.len(),
        query.organization,
        query.file_type
    );
    attachment(&rows, query.file_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: i64, day: &str, correct: i64, total: i64) -> DailyTotals {
        DailyTotals {
            id,
            day: day.parse::<NaiveDate>().unwrap(),
            correct,
            total,
        }
    }

    #[test]
    fn series_are_grouped_by_subject() {
        let series = build_series(vec![
            row(2, "2025-03-01", 3, 4),
            row(2, "2025-03-02", 2, 2),
            row(5, "2025-03-01", 1, 3),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].id, 2);
        assert_eq!(series[0].dynamic_time.len(), 2);
        assert_eq!(series[0].dynamic_time[0].average_score, 75.0);
        assert_eq!(series[0].dynamic_time[1].average_score, 100.0);
        assert_eq!(series[1].id, 5);
        assert_eq!(series[1].dynamic_time[0].average_score, 33.33);
    }

    #[test]
    fn empty_range_gives_empty_series() {
        assert!(build_series(Vec::new()).is_empty());
    }

    #[test]
    fn days_without_questions_score_zero() {
        let series = build_series(vec![row(1, "2025-03-01", 0, 0)]);
        assert_eq!(series[0].dynamic_time[0].average_score, 0.0);
    }

    #[test]
    fn csv_export_starts_with_header() {
        let rows = vec![ResultExportDTO {
            id: 3,
            user: "bob".to_string(),
            organization: "Acme".to_string(),
            quiz: "Arithmetic".to_string(),
            score: 100.0,
            date_passed: "2025-03-02 09:00:00".to_string(),
        }];

        let body = String::from_utf8(render_export(&rows, ExportFormat::Csv).unwrap()).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("id,user,organization,quiz,score,date passed"));
        assert_eq!(lines.next(), Some("3,bob,Acme,Arithmetic,100.0,2025-03-02 09:00:00"));
        assert_eq!(lines.next(), None);
    }
}
