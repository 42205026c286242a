//! Integration tests per gli endpoints di autenticazione
//!
//! Test per:
//! - POST /auth/login
//! - POST /auth/register
//! - middleware di autenticazione sulle routes protette
//!
//! Questi test usano `#[sqlx::test]` che:
//! - Crea automaticamente un database di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`
//! - Pulisce il database al termine

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // Test per POST /auth/login - login_user
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_success(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // Prima registriamo un nuovo utente
        let register_body = json!({
            "username": "logintest",
            "password": "TestLogin123"
        });
        server
            .post("/auth/register")
            .json(&register_body)
            .await
            .assert_status(StatusCode::CREATED);

        // Poi facciamo login con le stesse credenziali
        let response = server.post("/auth/login").json(&register_body).await;
        response.assert_status_ok();

        let auth_header = response
            .headers()
            .get("authorization")
            .expect("Authorization header should be present")
            .to_str()
            .unwrap()
            .to_string();
        assert!(
            auth_header.starts_with("Bearer "),
            "Authorization should start with 'Bearer '"
        );

        let token: serde_json::Value = response.json();
        assert_eq!(token["token_type"], "Bearer");
        assert_eq!(
            format!("Bearer {}", token["access_token"].as_str().unwrap()),
            auth_header
        );

        // Il token ottenuto apre le routes protette
        server
            .get("/notifications")
            .add_header(authorization(), auth_header)
            .await
            .assert_status_ok();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_wrong_password(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/auth/register")
            .json(&json!({"username": "erin", "password": "rightpassword"}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/auth/login")
            .json(&json!({"username": "erin", "password": "wrongpassword"}))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_nonexistent_user(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/login")
            .json(&json!({"username": "nonexistent", "password": "password123"}))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_missing_password(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/login")
            .json(&json!({"username": "alice"}))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Test per POST /auth/register - register_user
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_success(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/register")
            .json(&json!({"username": "newuser", "password": "Password123"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: serde_json::Value = response.json();
        assert!(user.get("id").is_some(), "User should have an id");
        assert_eq!(user["username"], "newuser", "Username should match");
        assert!(user.get("password").is_none(), "Password must never be returned");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_duplicate_username(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/register")
            .json(&json!({"username": "alice", "password": "Password123"}))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_username_too_short(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/register")
            .json(&json!({"username": "ab", "password": "Password123"}))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_username_invalid_characters(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/register")
            .json(&json!({"username": "bad user!", "password": "Password123"}))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_password_too_short(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/register")
            .json(&json!({"username": "shortpw", "password": "Ab1"}))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_empty_body(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.post("/auth/register").json(&json!({})).await;

        response.assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Middleware di autenticazione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_protected_route_without_token(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server.get("/organizations").await.assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_protected_route_with_invalid_token(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/organizations")
            .add_header(authorization(), "Bearer invalid_token_here")
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_token_of_unknown_user(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/organizations")
            .add_header(authorization(), bearer(999))
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test]
    async fn test_health_check(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text("Server is running!");
        Ok(())
    }
}
