//! NotificationRepository - Notifiche in-app persistite per utente

use super::Create;
use crate::dtos::CreateNotificationDTO;
use crate::entities::{Notification, NotificationStatus};
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, text, status, created_at";

pub struct NotificationRepository {
    connection_pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Più recenti per prime
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE user_id = ?
            ORDER BY datetime(created_at) DESC, notification_id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Segna come letta una notifica non letta dell'utente; `None` se non esiste
    /// o appartiene ad altri o era già letta
    pub async fn mark_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<Option<Notification>, Error> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET status = ?
            WHERE notification_id = ? AND user_id = ? AND status = 'unread'
            "#,
        )
        .bind(NotificationStatus::Read)
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notification_id = ?"
        ))
        .bind(notification_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Create<Notification, CreateNotificationDTO> for NotificationRepository {
    async fn create(&self, data: &CreateNotificationDTO) -> Result<Notification, Error> {
        let now = Utc::now();
        let status = NotificationStatus::Unread;
        let result = sqlx::query(
            "INSERT INTO notifications (user_id, text, status, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(data.user_id)
        .bind(&data.text)
        .bind(status)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Notification {
            notification_id: result.last_insert_rowid(),
            user_id: data.user_id,
            text: data.text.clone(),
            status,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "notifications")))]
    async fn only_the_owner_marks_a_notification_read(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = NotificationRepository::new(pool);

        assert!(repo.mark_read(1, 2).await?.is_none());

        let read = repo.mark_read(1, 1).await?.expect("alice's notification");
        assert_eq!(read.status, NotificationStatus::Read);

        // already read
        assert!(repo.mark_read(1, 1).await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "notifications")))]
    async fn newest_notifications_come_first(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = NotificationRepository::new(pool);
        repo.create(&CreateNotificationDTO {
            user_id: 1,
            text: "fresh".to_string(),
        })
        .await?;

        let list = repo.list_for_user(1).await?;
        assert_eq!(list[0].text, "fresh");
        assert!(list.iter().all(|n| n.user_id == 1));
        Ok(())
    }
}
