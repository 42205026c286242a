//! Membership DTOs - richieste e risposte del Membership Ledger

use crate::entities::{Membership, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body per leave
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LeaveOrganizationDTO {
    pub organization: i64,
}

/// Body per kick, appoint-admin e remove-admin
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MemberTargetDTO {
    pub organization: i64,
    pub user: i64,
}

/// Membro di un'organizzazione come mostrato nelle liste
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MemberDTO {
    pub user_id: i64,
    pub organization_id: i64,
    pub username: String,
    pub role: Role,
    pub member_since: DateTime<Utc>,
    /// Ultimo risultato nell'organizzazione, visibile solo ad admin e owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_quiz_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RoleDTO {
    pub role: Option<Role>,
}

impl From<Option<Membership>> for RoleDTO {
    fn from(value: Option<Membership>) -> Self {
        Self {
            role: value.map(|m| m.role),
        }
    }
}

/// DTO per inserire una riga nel ledger
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMembershipDTO {
    pub user_id: i64,
    pub organization_id: i64,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DetailDTO {
    pub detail: &'static str,
}

impl DetailDTO {
    pub fn new(detail: &'static str) -> Self {
        Self { detail }
    }
}
