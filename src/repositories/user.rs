//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Read};
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

// USER REPO
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    ///considero l'username univoco
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    /// `data.password` deve essere già l'hash bcrypt
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let now = Utc::now();
        let result =
            sqlx::query("INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)")
                .bind(&data.username)
                .bind(&data.password)
                .bind(now)
                .execute(&self.connection_pool)
                .await?;

        Ok(User {
            user_id: result.last_insert_rowid(),
            username: data.username.clone(),
            password: data.password.clone(),
            created_at: now,
        })
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, password, created_at FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn finds_fixture_users_by_name(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        let alice = repo.find_by_username("alice").await?.expect("alice exists");
        assert_eq!(alice.user_id, 1);
        assert!(repo.find_by_username("nobody").await?.is_none());

        let read = repo.read(&alice.user_id).await?.expect("alice by id");
        assert_eq!(read.username, "alice");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn duplicated_username_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);
        let dto = CreateUserDTO {
            username: "alice".to_string(),
            password: "hash".to_string(),
        };

        let err = repo.create(&dto).await.expect_err("username is unique");
        assert!(matches!(err, Error::Database(ref db) if db.is_unique_violation()));
        Ok(())
    }
}
