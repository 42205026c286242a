//! Invitation DTOs - Data Transfer Objects per inviti

use crate::entities::{Invitation, InvitationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InvitationDTO {
    pub id: i64,
    pub sender: i64,
    pub receiver: i64,
    pub organization: i64,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationDTO {
    fn from(value: Invitation) -> Self {
        Self {
            id: value.invitation_id,
            sender: value.sender_id,
            receiver: value.receiver_id,
            organization: value.organization_id,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// Body della richiesta di invito (il mittente è l'utente autenticato)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InviteUserDTO {
    pub receiver: i64,
    pub organization: i64,
}

/// DTO per creare un nuovo invito (senza id, status e created_at)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInvitationDTO {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub organization_id: i64,
}

/// DTO per aggiornare un invito (solo lo stato è modificabile)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateInvitationDTO {
    pub status: InvitationStatus,
}
