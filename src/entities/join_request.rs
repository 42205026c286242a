//! JoinRequest entity - Richiesta di adesione ad un'organizzazione

use super::enums::JoinRequestStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct JoinRequest {
    pub request_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64, // owner dell'organizzazione al momento della richiesta
    pub organization_id: i64,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
}
