//! Quiz services - CRUD dei quiz e flusso start/finish delle sessioni

use super::access::{load_organization, require_manager, require_membership};
use super::notification::fan_out;
use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateQuizDTO, FinishQuizDTO, OrganizationQuery, QuestionDTO, QuestionView, QuizDTO,
    QuizQuery, QuizResultDTO, StartedQuizDTO, UpdateQuizDTO, check_questions,
};
use crate::entities::{Quiz, User, count_correct};
use crate::repositories::{Delete, Read};
use axum::{
    Extension,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use axum_macros::debug_handler;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

async fn load_quiz(state: &AppState, quiz_id: i64) -> Result<Quiz, AppError> {
    state
        .quiz
        .read(&quiz_id)
        .await?
        .ok_or_else(|| AppError::not_found("Quiz not found"))
}

fn validate_questions(questions: &[QuestionDTO]) -> Result<(), AppError> {
    check_questions(questions).map_err(|reason| {
        debug!("Rejected questions: {}", reason);
        AppError::bad_request("Invalid questions").with_details(reason)
    })
}

async fn quiz_with_questions(
    state: &AppState,
    quiz: Quiz,
    with_solutions: bool,
) -> Result<QuizDTO, AppError> {
    let questions = state.quiz.questions(quiz.quiz_id).await?;
    let views = questions
        .into_iter()
        .map(if with_solutions {
            QuestionView::full
        } else {
            QuestionView::without_solution
        })
        .collect();
    Ok(QuizDTO::from(quiz).with_questions(views))
}

/// Quiz di tutte le organizzazioni del chiamante, senza domande
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<QuizDTO>>, AppError> {
    let quizzes = state.quiz.list_for_member(current_user.user_id).await?;
    debug!("Found {} quizzes", quizzes.len());
    Ok(Json(quizzes.into_iter().map(QuizDTO::from).collect()))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<CreateQuizDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<QuizDTO>), AppError> {
    // 1. Organizzazione esistente (404), chiamante admin o owner (403)
    // 2. Validare titolo, frequenza e domande (400)
    // 3. Salvare quiz e domande in una transazione
    // 4. Notificare tutti gli altri membri dell'organizzazione
    let Json(body) = body?;
    let organization = load_organization(&state, body.organization).await?;
    require_manager(&state, current_user.user_id, body.organization).await?;

    body.validate()?;
    validate_questions(&body.questions)?;

    let quiz = state.quiz.create_with_questions(&body).await?;
    info!("Quiz {} created", quiz.quiz_id);

    let recipients: Vec<i64> = state
        .membership
        .member_ids(organization.organization_id)
        .await?
        .into_iter()
        .filter(|&id| id != current_user.user_id)
        .collect();
    if let Err(e) = fan_out(
        &state,
        &recipients,
        &format!("New quiz \"{}\" in {}", quiz.title, organization.name),
    )
    .await
    {
        warn!(quiz_id = quiz.quiz_id, "Failed to notify members: {}", e.message());
    }

    let dto = quiz_with_questions(&state, quiz, true).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizDTO>, AppError> {
    let quiz = load_quiz(&state, quiz_id).await?;
    let membership = require_membership(&state, current_user.user_id, quiz.organization_id).await?;

    let dto = quiz_with_questions(&state, quiz, membership.role.can_manage_quizzes()).await?;
    Ok(Json(dto))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
    body: Result<Json<UpdateQuizDTO>, JsonRejection>,
) -> Result<Json<QuizDTO>, AppError> {
    let Json(body) = body?;
    let quiz = load_quiz(&state, quiz_id).await?;
    require_manager(&state, current_user.user_id, quiz.organization_id).await?;

    body.validate()?;
    validate_questions(&body.questions)?;

    // ogni id al più una volta, altrimenti il diff fonde le voci in una sola riga
    let mut seen = HashSet::new();
    if let Some(repeated) = body
        .questions
        .iter()
        .filter_map(|q| q.id)
        .find(|id| !seen.insert(*id))
    {
        warn!("Question {} listed twice in update of quiz {}", repeated, quiz_id);
        return Err(AppError::bad_request("Question listed more than once")
            .with_details(format!("question id {repeated}")));
    }

    let known = state.quiz.question_ids(quiz_id).await?;
    if let Some(foreign) = body
        .questions
        .iter()
        .filter_map(|q| q.id)
        .find(|id| !known.contains(id))
    {
        warn!("Question {} does not belong to quiz {}", foreign, quiz_id);
        return Err(AppError::bad_request("Question does not belong to this quiz")
            .with_details(format!("question id {foreign}")));
    }

    let updated = state.quiz.update_with_questions(quiz_id, &body).await?;
    info!("Quiz {} updated", quiz_id);
    Ok(Json(quiz_with_questions(&state, updated, true).await?))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(quiz_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let quiz = load_quiz(&state, quiz_id).await?;
    require_manager(&state, current_user.user_id, quiz.organization_id).await?;

    state.quiz.delete(&quiz_id).await?;
    info!("Quiz {} deleted", quiz_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Admin e owner ricevono le domande complete, i membri solo il riepilogo
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn organization_quizzes(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> Result<Json<Vec<QuizDTO>>, AppError> {
    let Query(query) = query?;
    load_organization(&state, query.organization).await?;
    let membership =
        require_membership(&state, current_user.user_id, query.organization).await?;

    let quizzes = state.quiz.list_for_organization(query.organization).await?;
    if !membership.role.can_manage_quizzes() {
        return Ok(Json(quizzes.into_iter().map(QuizDTO::from).collect()));
    }

    let mut result = Vec::with_capacity(quizzes.len());
    for quiz in quizzes {
        result.push(quiz_with_questions(&state, quiz, true).await?);
    }
    Ok(Json(result))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn start_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<QuizQuery>, QueryRejection>,
) -> Result<Json<StartedQuizDTO>, AppError> {
    // 1. 404 se il quiz non esiste, 403 se il chiamante non è membro
    // 2. Riprendere la sessione `started` esistente oppure crearne una nuova
    // 3. Le domande vengono restituite senza le risposte corrette
    let Query(query) = query?;
    let quiz = load_quiz(&state, query.quiz).await?;
    require_membership(&state, current_user.user_id, quiz.organization_id).await?;

    let session = match state
        .session
        .find_started(current_user.user_id, quiz.quiz_id)
        .await?
    {
        Some(session) => {
            debug!("Resuming session {}", session.session_id);
            session
        }
        None => {
            let session = state.session.start(current_user.user_id, quiz.quiz_id).await?;
            info!("Session {} started", session.session_id);
            session
        }
    };

    let questions = state.quiz.questions(quiz.quiz_id).await?;
    Ok(Json(StartedQuizDTO::new(session, quiz, questions)))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn finish_quiz(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<FinishQuizDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<QuizResultDTO>), AppError> {
    // 1. session e answers obbligatori (400)
    // 2. La sessione deve esistere ed essere del chiamante (404)
    // 3. Una sessione completata non si chiude due volte (400)
    // 4. Correzione per uguaglianza di insiemi, risultato salvato insieme al cambio di stato
    let Json(body) = body?;
    body.validate()?;
    let session_id = body
        .session
        .ok_or_else(|| AppError::bad_request("Quiz session and answers are required"))?;

    let session = state
        .session
        .read(&session_id)
        .await?
        .filter(|s| s.user_id == current_user.user_id)
        .ok_or_else(|| AppError::not_found("Quiz session not found"))?;

    if session.is_completed() {
        return Err(AppError::bad_request("Quiz already completed"));
    }

    let questions = state.quiz.questions(session.quiz_id).await?;
    let correct = count_correct(
        &questions,
        body.answers
            .iter()
            .map(|a| (a.id, a.correct_answer.as_slice())),
    );

    let result = state
        .session
        .complete(&session, correct, questions.len() as i64)
        .await?
        .ok_or_else(|| AppError::bad_request("Quiz already completed"))?;

    info!(
        "Session {} completed: {}/{}",
        session_id, result.correct_answers, result.total_questions
    );
    Ok((StatusCode::CREATED, Json(QuizResultDTO::from(result))))
}
