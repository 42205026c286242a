use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::dtos::NotificationDTO;

/// Segnali inviati al task di scrittura del WebSocket di un utente
#[derive(Debug)]
pub enum InternalSignal {
    Shutdown,
    Notification(NotificationDTO),
}

/// Canale per-utente delle connessioni attive: una sola connessione per utente,
/// l'ultima registrata sostituisce le precedenti.
pub struct UserMap {
    users_online: DashMap<i64, UnboundedSender<InternalSignal>>,
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            users_online: DashMap::new(),
        }
    }

    #[instrument(skip(self, tx), fields(user_id = %user_id))]
    pub fn register_online(&self, user_id: i64, tx: UnboundedSender<InternalSignal>) {
        info!("Registering user {} as online", user_id);
        self.users_online.insert(user_id, tx);
        info!("Total online users: {}", self.users_online.len());
    }

    /// Rimuove l'utente solo se il canale registrato è ancora `tx`:
    /// una connessione vecchia che si chiude non deve scollegare quella nuova.
    #[instrument(skip(self, tx), fields(user_id = %user_id))]
    pub fn remove_from_online(&self, user_id: &i64, tx: &UnboundedSender<InternalSignal>) {
        let removed = self
            .users_online
            .remove_if(user_id, |_, current| current.same_channel(tx));
        if removed.is_some() {
            info!("Removing user from online");
        } else {
            debug!("Connection already replaced, keeping the newer one");
        }
    }

    /// Best-effort: ritorna `true` se il segnale è stato consegnato al canale dell'utente
    #[instrument(skip(self, message), fields(user_id = %user_id))]
    pub fn send_server_message_if_online(&self, user_id: &i64, message: InternalSignal) -> bool {
        let message_type = match &message {
            InternalSignal::Shutdown => "Shutdown",
            InternalSignal::Notification(notification) => {
                debug!("Sending notification {}", notification.id);
                "Notification"
            }
        };

        if let Some(entry) = self.users_online.get(user_id) {
            let tx = entry.value();
            if let Err(e) = tx.send(message) {
                warn!("Failed to send {} message to user: {:?}", message_type, e);
                false
            } else {
                debug!("{} message sent to online user", message_type);
                true
            }
        } else {
            debug!("User {} not online, {} message not sent", user_id, message_type);
            false
        }
    }

    /// Get the count of online users
    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    /// Check if a specific user is online
    pub fn is_user_online(&self, user_id: &i64) -> bool {
        self.users_online.contains_key(user_id)
    }
}
