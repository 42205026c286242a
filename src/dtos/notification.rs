//! Notification DTOs, incluso l'evento inviato sul WebSocket

use crate::entities::{Notification, NotificationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationDTO {
    pub id: i64,
    pub user: i64,
    pub text: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDTO {
    fn from(value: Notification) -> Self {
        Self {
            id: value.notification_id,
            user: value.user_id,
            text: value.text,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateNotificationDTO {
    pub user_id: i64,
    pub text: String,
}

/// Tagged union per eventi WebSocket
/// Serde serializza questo come:
/// { "type": "new_notification", "notification": { ... } }
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEventDTO {
    NewNotification { notification: NotificationDTO },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_event_wire_format() {
        let event = WsEventDTO::NewNotification {
            notification: NotificationDTO {
                id: 7,
                user: 3,
                text: "New quiz".to_string(),
                status: NotificationStatus::Unread,
                created_at: Utc::now(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "new_notification");
        assert_eq!(json["notification"]["id"], 7);
        assert_eq!(json["notification"]["status"], "unread");
    }
}
