//! Organization entity - Entità organizzazione (tenant)

use super::enums::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Organization {
    pub organization_id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }
}
