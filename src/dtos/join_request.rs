//! JoinRequest DTOs

use crate::entities::{JoinRequest, JoinRequestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JoinRequestDTO {
    pub id: i64,
    pub sender: i64,
    pub receiver: i64,
    pub organization: i64,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<JoinRequest> for JoinRequestDTO {
    fn from(value: JoinRequest) -> Self {
        Self {
            id: value.request_id,
            sender: value.sender_id,
            receiver: value.receiver_id,
            organization: value.organization_id,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// Body: l'utente autenticato chiede di entrare in `organization`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RequestToJoinDTO {
    pub organization: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateJoinRequestDTO {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub organization_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateJoinRequestDTO {
    pub status: JoinRequestStatus,
}
