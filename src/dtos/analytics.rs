//! Analytics DTOs - risposte in sola lettura delle statistiche

use crate::entities::percentage;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrganizationScoreDTO {
    pub organization: i64,
    pub user: i64,
    pub average_score: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRatingDTO {
    pub user: i64,
    pub average_score: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyScoreDTO {
    pub day: NaiveDate,
    pub average_score: f64,
}

/// Serie giornaliera per un utente (o per un quiz, quando si filtra per utente)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DynamicScoreDTO {
    pub id: i64,
    pub dynamic_time: Vec<DailyScoreDTO>,
}

/// Ultimo completamento di ciascun quiz di un'organizzazione, da parte di chiunque
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct LastCompletionDTO {
    pub quiz: i64,
    pub title: String,
    pub last_completed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MyLastCompletionDTO {
    pub quiz: i64,
    pub title: String,
    pub organization: i64,
    pub last_completed_at: DateTime<Utc>,
}

/// Formato del file esportato
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn content_disposition(self) -> &'static str {
        match self {
            ExportFormat::Json => "attachment; filename=\"results.json\"",
            ExportFormat::Csv => "attachment; filename=\"results.csv\"",
        }
    }
}

/// `file_type` è obbligatorio per l'export del proprio risultato
#[derive(Serialize, Deserialize, Debug)]
pub struct ExportResultQuery {
    pub quiz: i64,
    pub file_type: ExportFormat,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ExportOrganizationResultsQuery {
    pub organization: i64,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub file_type: ExportFormat,
}

/// Riga letta dal database per l'export, con i nomi già risolti
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResultExportRow {
    pub id: i64,
    pub user: String,
    pub organization: String,
    pub quiz: String,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub created_at: DateTime<Utc>,
}

/// Riga esportata; i nomi dei campi sono anche le intestazioni del CSV
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultExportDTO {
    pub id: i64,
    pub user: String,
    pub organization: String,
    pub quiz: String,
    pub score: f64,
    #[serde(rename = "date passed")]
    pub date_passed: String,
}

impl From<ResultExportRow> for ResultExportDTO {
    fn from(value: ResultExportRow) -> Self {
        Self {
            score: percentage(value.correct_answers, value.total_questions),
            date_passed: value.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            id: value.id,
            user: value.user,
            organization: value.organization,
            quiz: value.quiz,
        }
    }
}
