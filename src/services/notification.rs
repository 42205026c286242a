//! Notification services - Fan-out e lettura delle notifiche in-app
//!
//! Il fan-out è in due passi per ogni destinatario: prima la riga nel database
//! (fonte di verità), poi il push best-effort sul canale WebSocket se l'utente è
//! online. Un push fallito non annulla nulla, viene solo loggato.

use crate::core::{AppError, AppState};
use crate::dtos::{CreateNotificationDTO, NotificationDTO, NotificationQuery};
use crate::entities::User;
use crate::repositories::Create;
use crate::ws::usermap::InternalSignal;
use axum::{
    Extension,
    extract::{Json, Query, State, rejection::QueryRejection},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Persiste e pubblica una notifica per ciascun utente in `recipients`
#[instrument(skip(state, recipients, text), fields(recipients = recipients.len()))]
pub async fn fan_out(
    state: &AppState,
    recipients: &[i64],
    text: &str,
) -> Result<Vec<NotificationDTO>, AppError> {
    let mut delivered = Vec::with_capacity(recipients.len());

    for &user_id in recipients {
        let notification = state
            .notification
            .create(&CreateNotificationDTO {
                user_id,
                text: text.to_string(),
            })
            .await?;
        let dto = NotificationDTO::from(notification);

        if state.users_online.is_user_online(&user_id)
            && !state
                .users_online
                .send_server_message_if_online(&user_id, InternalSignal::Notification(dto.clone()))
        {
            warn!(user_id, notification_id = dto.id, "Failed to push notification");
        }
        delivered.push(dto);
    }

    info!("Created {} notifications", delivered.len());
    Ok(delivered)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<NotificationDTO>>, AppError> {
    let notifications = state
        .notification
        .list_for_user(current_user.user_id)
        .await?;

    debug!("Found {} notifications", notifications.len());
    Ok(Json(
        notifications.into_iter().map(NotificationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn mark_as_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<NotificationQuery>, QueryRejection>,
) -> Result<Json<NotificationDTO>, AppError> {
    let Query(query) = query?;

    let notification = state
        .notification
        .mark_read(query.notification_id, current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification not found or already read"))?;

    Ok(Json(NotificationDTO::from(notification)))
}

// Le notifiche nascono solo dal fan-out e non si cancellano

pub async fn create_notification() -> AppError {
    AppError::forbidden("Notifications cannot be created directly")
}

pub async fn delete_notification() -> AppError {
    AppError::forbidden("Notifications cannot be deleted")
}
