//! User DTOs - Data Transfer Objects per utenti

use crate::entities::User;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    static ref USERNAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_.-]+$").expect("username pattern is valid");
}

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            username: value.username,
            created_at: value.created_at, // la password non viene mai esposta al client
        }
    }
}

/// DTO per registrare un nuovo utente
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 3, max = 32), regex(path = *USERNAME_REGEX))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// DTO per il login (solo username e password)
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenDTO {
    pub access_token: String,
    pub token_type: String,
}
