//! QuizSession entity - Tentativo in corso di un utente su un quiz

use super::enums::SessionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct QuizSession {
    pub session_id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
