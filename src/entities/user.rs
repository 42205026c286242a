//! User entity - Entità utente con metodi per gestione password

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hashed = User::hash_password("Secret123").unwrap();
        let user = User {
            user_id: 1,
            username: "alice".to_string(),
            password: hashed,
            created_at: Utc::now(),
        };
        assert!(user.verify_password("Secret123"));
        assert!(!user.verify_password("secret123"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        let user = User {
            user_id: 1,
            username: "alice".to_string(),
            password: "not-a-bcrypt-hash".to_string(),
            created_at: Utc::now(),
        };
        assert!(!user.verify_password("not-a-bcrypt-hash"));
    }
}
