//! Notification entity

use super::enums::NotificationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    pub text: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}
