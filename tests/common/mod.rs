#![allow(dead_code)]

use axum_test::TestServer;
use quizhub::core::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const TEST_JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Crea un AppState per i test
///
/// # Arguments
/// * `pool` - Connection pool SQLite fornito da `#[sqlx::test]`
///
/// # Returns
/// Arc<AppState> configurato con il JWT secret di test
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, TEST_JWT_SECRET.to_string()))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = quizhub::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT token per testing
///
/// # Arguments
/// * `user_id` - ID dell'utente per cui generare il token
/// * `username` - Username dell'utente
/// * `jwt_secret` - Secret key per firmare il token
///
/// # Returns
/// Token JWT valido per 24 ore
pub fn create_test_jwt(user_id: i64, username: &str, jwt_secret: &str) -> String {
    quizhub::core::encode_jwt(username.to_string(), user_id, jwt_secret)
        .expect("Failed to create JWT token")
}

/// Valore dell'header Authorization per uno degli utenti dei fixtures
///
/// 1 alice, 2 bob, 3 charlie, 4 dave
pub fn bearer(user_id: i64) -> String {
    let username = match user_id {
        1 => "alice",
        2 => "bob",
        3 => "charlie",
        4 => "dave",
        _ => "ghost",
    };
    format!(
        "Bearer {}",
        create_test_jwt(user_id, username, TEST_JWT_SECRET)
    )
}

/// Nome dell'header usato per il bearer token
pub fn authorization() -> axum_test::http::HeaderName {
    axum_test::http::HeaderName::from_static("authorization")
}
