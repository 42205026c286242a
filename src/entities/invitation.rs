//! Invitation entity - Entità invito

use super::enums::InvitationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Invitation {
    pub invitation_id: i64,
    pub sender_id: i64,   // owner che invita
    pub receiver_id: i64, // utente invitato
    pub organization_id: i64,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}
