//! Promemoria periodici - Notifica i membri che devono ripetere un quiz
//!
//! Un quiz è "scaduto" quando è più vecchio della sua `frequency_days`; per ogni
//! quiz scaduto vengono avvisati i membri dell'organizzazione che non hanno un
//! risultato più recente della frequenza. Le notifiche passano dal normale
//! fan-out, quindi arrivano anche via WebSocket agli utenti online.

use crate::core::{AppError, AppState};
use crate::services::fan_out;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument};

/// Configurazione del job dei promemoria
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Intervallo tra due passate (in secondi)
    pub interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: 86_400,
        }
    }
}

pub fn reminder_text(title: &str) -> String {
    format!("Reminder: quiz \"{title}\" is waiting for you")
}

/// Esegue una singola passata e ritorna il numero di notifiche create
#[instrument(skip(state))]
pub async fn run_reminders(state: &AppState) -> Result<usize, AppError> {
    let due = state.quiz.list_due().await?;
    debug!("{} quizzes past their frequency", due.len());

    let mut sent = 0;
    for quiz in due {
        let recipients = state.quiz.members_due(&quiz).await?;
        if recipients.is_empty() {
            continue;
        }
        let notifications = fan_out(state, &recipients, &reminder_text(&quiz.title)).await?;
        sent += notifications.len();
    }

    info!("Reminder pass done, {} notifications sent", sent);
    Ok(sent)
}

/// Avvia il loop dei promemoria in un task separato
///
/// # Esempio
/// ```ignore
/// start_reminders(state.clone(), ReminderConfig { interval_secs: 3600 });
/// ```
pub fn start_reminders(state: Arc<AppState>, config: ReminderConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting quiz reminders with interval: {} seconds", config.interval_secs);
        let mut interval = time::interval(Duration::from_secs(config.interval_secs));

        // Salta il primo tick che avviene immediatamente
        interval.tick().await;

        loop {
            interval.tick().await;
            // un errore su una passata non ferma il job
            if let Err(e) = run_reminders(&state).await {
                error!("Reminder pass failed: {:?}", e);
            }
        }
    })
}
