//! WebSocket Module - Canale real-time delle notifiche
//!
//! Include:
//! - Upgrade HTTP -> WebSocket con autenticazione via query `token`
//! - Gestione connessioni (split sender/receiver)
//! - Mappa degli utenti online usata dal fan-out delle notifiche

pub mod connection;
pub mod usermap;

pub use connection::handle_socket;

use crate::core::{AppError, AppState, auth::user_from_token};
use axum::{
    extract::{
        Query, State,
        rejection::QueryRejection,
        ws::{WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Ogni quanto il server invia un ping al client
pub const PING_INTERVAL_SECONDS: u64 = 30;
/// Chiusura della connessione se il client non invia nulla (neanche pong)
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;

#[derive(Deserialize, Debug)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// Entry point per gestire richieste di upgrade WebSocket
/// Operazioni:
/// 1. Validare il token passato in query (401 prima dell'upgrade)
/// 2. Eseguire upgrade HTTP -> WebSocket
/// 3. Passare la connessione ad handle_socket
#[instrument(skip_all)]
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WsAuthQuery>, QueryRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let token = query
        .ok()
        .and_then(|Query(q)| q.token)
        .ok_or_else(|| AppError::unauthorized("Missing token"))?;

    let current_user = user_from_token(&state, &token).await.map_err(|e| {
        warn!("Rejected WebSocket connection: {}", e.message());
        AppError::unauthorized("Invalid token")
    })?;

    let ws = ws.map_err(|e| {
        AppError::bad_request("Expected a WebSocket upgrade").with_details(e.body_text())
    })?;

    let user_id = current_user.user_id;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}
