//! Membership entity - Riga del Membership Ledger (utente, organizzazione, ruolo)

use super::enums::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Membership {
    pub user_id: i64,
    pub organization_id: i64,
    pub role: Role,
    pub member_since: DateTime<Utc>,
}
