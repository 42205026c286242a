//! Quiz DTOs - domande, sessioni e risultati
//!
//! Le domande arrivano dal client come liste di stringhe; le regole di forma
//! (almeno due domande, almeno due opzioni, risposta corretta non vuota e
//! contenuta nelle opzioni) sono in [`check_questions`], usata sia in
//! creazione che in aggiornamento.

use crate::entities::{Question, Quiz, QuizResult, QuizSession, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_frequency() -> i64 {
    30
}

/// Domanda come inviata dal client. `id` è presente solo in aggiornamento
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuestionDTO {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    pub answers: Vec<String>,
    pub correct_answer: Vec<String>,
}

pub fn check_questions(questions: &[QuestionDTO]) -> Result<(), &'static str> {
    if questions.len() < 2 {
        return Err("A quiz needs at least two questions");
    }
    for question in questions {
        if question.text.trim().is_empty() {
            return Err("Question text cannot be empty");
        }
        if question.answers.len() < 2 {
            return Err("Each question needs at least two answer options");
        }
        if question.correct_answer.is_empty() {
            return Err("Each question needs at least one correct answer");
        }
        if !question
            .correct_answer
            .iter()
            .all(|answer| question.answers.contains(answer))
        {
            return Err("Correct answers must be among the answer options");
        }
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateQuizDTO {
    pub organization: i64,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_frequency")]
    #[validate(range(min = 1))]
    pub frequency_days: i64,
    pub questions: Vec<QuestionDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateQuizDTO {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_frequency")]
    #[validate(range(min = 1))]
    pub frequency_days: i64,
    pub questions: Vec<QuestionDTO>,
}

/// Domanda restituita al client; `correct_answer` solo per admin e owner
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    pub answers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Vec<String>>,
}

impl QuestionView {
    pub fn full(question: Question) -> Self {
        Self {
            id: question.question_id,
            text: question.text,
            answers: question.answers,
            correct_answer: Some(question.correct_answer),
        }
    }

    pub fn without_solution(question: Question) -> Self {
        Self {
            id: question.question_id,
            text: question.text,
            answers: question.answers,
            correct_answer: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizDTO {
    pub id: i64,
    pub organization: i64,
    pub title: String,
    pub description: String,
    pub frequency_days: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionView>>,
}

impl From<Quiz> for QuizDTO {
    fn from(value: Quiz) -> Self {
        Self {
            id: value.quiz_id,
            organization: value.organization_id,
            title: value.title,
            description: value.description,
            frequency_days: value.frequency_days,
            created_at: value.created_at,
            questions: None,
        }
    }
}

impl QuizDTO {
    pub fn with_questions(mut self, questions: Vec<QuestionView>) -> Self {
        self.questions = Some(questions);
        self
    }
}

/// Risposta di start-quiz: la sessione attiva e le domande senza soluzione
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StartedQuizDTO {
    pub session: i64,
    pub quiz: i64,
    pub title: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
}

impl StartedQuizDTO {
    pub fn new(session: QuizSession, quiz: Quiz, questions: Vec<Question>) -> Self {
        Self {
            session: session.session_id,
            quiz: quiz.quiz_id,
            title: quiz.title,
            status: session.status,
            started_at: session.started_at,
            questions: questions
                .into_iter()
                .map(QuestionView::without_solution)
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmittedAnswerDTO {
    pub id: i64,
    #[serde(default)]
    pub correct_answer: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct FinishQuizDTO {
    pub session: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub answers: Vec<SubmittedAnswerDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizResultDTO {
    pub id: i64,
    pub user: i64,
    pub quiz: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub score: f64,
    pub elapsed_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl From<QuizResult> for QuizResultDTO {
    fn from(value: QuizResult) -> Self {
        Self {
            score: value.score(),
            id: value.result_id,
            user: value.user_id,
            quiz: value.quiz_id,
            correct_answers: value.correct_answers,
            total_questions: value.total_questions,
            elapsed_ms: value.elapsed_ms,
            created_at: value.created_at,
        }
    }
}

/// Dati per inserire una domanda nel repository
#[derive(Debug, Clone)]
pub struct NewQuestion<'a> {
    pub position: i64,
    pub text: &'a str,
    pub answers: &'a [String],
    pub correct_answer: &'a [String],
}

impl<'a> NewQuestion<'a> {
    pub fn from_dto(position: usize, dto: &'a QuestionDTO) -> Self {
        Self {
            position: position as i64,
            text: &dto.text,
            answers: &dto.answers,
            correct_answer: &dto.correct_answer,
        }
    }
}
