//! Organization DTOs

use crate::entities::{Organization, Role, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrganizationDTO {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    pub owner: i64,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationDTO {
    fn from(value: Organization) -> Self {
        Self {
            id: value.organization_id,
            name: value.name,
            description: value.description,
            visibility: value.visibility,
            owner: value.owner_id,
            owner_name: None, // da popolare manualmente se necessario
            created_at: value.created_at,
        }
    }
}

/// Versione ridotta usata dalle liste "my organizations"
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct OrganizationNameDTO {
    pub id: i64,
    pub name: String,
}

/// Organizzazione a cui l'utente corrente appartiene, con il suo ruolo
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct UserMembershipDTO {
    pub organization: i64,
    pub organization_name: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateOrganizationDTO {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    pub visibility: Visibility,
}

/// Aggiornamento parziale: solo i campi `Some(_)` vengono modificati
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateOrganizationDTO {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
}
