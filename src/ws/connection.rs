//! WebSocket Connection Management - Gestione connessioni WebSocket
//!
//! Il canale notifiche è unidirezionale: il server scrive, il client si limita
//! a tenere aperta la connessione (pong, close).

use crate::ws::{PING_INTERVAL_SECONDS, TIMEOUT_DURATION_SECONDS};
use crate::{AppState, dtos::WsEventDTO, ws::usermap::InternalSignal};
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Duration, interval, timeout};
use tracing::{debug, error, info, instrument, warn};

#[instrument(skip(ws, state), fields(user_id = %user_id))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user_id: i64) {
    info!("WebSocket connection established");

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // Canale interno: i service pubblicano qui, il task di scrittura inoltra al client
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.users_online.register_online(user_id, int_tx.clone());

    tokio::spawn(listen_ws(user_id, ws_rx, int_tx, state));
    tokio::spawn(write_ws(user_id, ws_tx, int_rx));
}

#[instrument(skip(websocket_tx, internal_rx), fields(user_id = %user_id))]
pub async fn write_ws(
    user_id: i64,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
) {
    info!("Write task started");

    let mut ping = interval(Duration::from_secs(PING_INTERVAL_SECONDS));
    ping.tick().await; // Consuma primo tick immediato

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if websocket_tx.send(Message::Ping(Default::default())).await.is_err() {
                    warn!("Failed to ping client, closing connection");
                    break;
                }
            }

            signal = internal_rx.recv() => {
                match signal {
                    Some(InternalSignal::Notification(notification)) => {
                        let id = notification.id;
                        let event = WsEventDTO::NewNotification { notification };
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if let Err(e) = websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await {
                                    error!("Failed to send notification: {:?}", e);
                                    break;
                                }
                                debug!(notification_id = id, "Notification pushed to client");
                            }
                            Err(e) => error!("Failed to serialize notification: {:?}", e),
                        }
                    }
                    Some(InternalSignal::Shutdown) => {
                        info!("Shutdown signal received");
                        break;
                    }
                    None => {
                        info!("Internal channel closed");
                        break; // connessione sostituita o listener chiuso
                    }
                }
            }
        }
    }

    let _ = websocket_tx.close().await;
    info!("Write task terminated");
}

#[instrument(skip(websocket_rx, internal_tx, state), fields(user_id = %user_id))]
pub async fn listen_ws(
    user_id: i64,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Listen task started");
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, websocket_rx.next()).await {
            Ok(Some(Ok(Message::Close(_)))) => {
                info!("Close message received");
                break;
            }
            Ok(Some(Ok(Message::Text(text)))) => {
                debug!(len = text.len(), "Ignoring client text frame");
            }
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => {
                warn!("WebSocket error: {:?}", e);
                break;
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(timeout_secs = TIMEOUT_DURATION_SECONDS, "Connection timeout");
                break;
            }
        }
    }

    // Cleanup
    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.users_online.remove_from_online(&user_id, &internal_tx);
    info!("Listen task terminated");
}
