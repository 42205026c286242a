//! Integration tests per il flusso degli inviti (/invitations)
//!
//! Fixtures: invito 1 alice -> dave per Acme (pending),
//! invito 2 bob -> charlie per Stealth (declined).

mod common;

#[cfg(test)]
mod invitation_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    async fn status_of(pool: &SqlitePool, invitation_id: i64) -> String {
        sqlx::query_scalar("SELECT status FROM invitations WHERE invitation_id = ?")
            .bind(invitation_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    // ============================================================
    // Test per POST /invitations - create_invitation
    // ============================================================

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_create_invitation_notifies_receiver(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .post("/invitations")
            .add_header(authorization(), bearer(2))
            .json(&json!({"receiver": 3, "organization": 2}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let invitation: serde_json::Value = response.json();
        assert_eq!(invitation["sender"], 2);
        assert_eq!(invitation["receiver"], 3);
        assert_eq!(invitation["status"], "pending");

        let notifications: Vec<serde_json::Value> = server
            .get("/notifications")
            .add_header(authorization(), bearer(3))
            .await
            .json();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["text"], "bob invited you to join Stealth");
        assert_eq!(notifications[0]["status"], "unread");
        Ok(())
    }

    /// L'invito salvato resta valido anche se la notifica non può essere scritta
    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_create_invitation_survives_notification_failure(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        sqlx::query("DROP TABLE notifications")
            .execute(&pool)
            .await?;

        server
            .post("/invitations")
            .add_header(authorization(), bearer(2))
            .json(&json!({"receiver": 3, "organization": 2}))
            .await
            .assert_status(StatusCode::CREATED);

        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM invitations WHERE receiver_id = 3 AND organization_id = 2 AND status = 'pending'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(pending, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_create_invitation_checks(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        // organizzazione inesistente
        server
            .post("/invitations")
            .add_header(authorization(), bearer(1))
            .json(&json!({"receiver": 4, "organization": 99}))
            .await
            .assert_status_not_found();

        // bob è solo admin di Acme
        server
            .post("/invitations")
            .add_header(authorization(), bearer(2))
            .json(&json!({"receiver": 4, "organization": 1}))
            .await
            .assert_status_forbidden();

        // destinatario inesistente
        server
            .post("/invitations")
            .add_header(authorization(), bearer(1))
            .json(&json!({"receiver": 99, "organization": 1}))
            .await
            .assert_status_not_found();

        // se stessi
        server
            .post("/invitations")
            .add_header(authorization(), bearer(1))
            .json(&json!({"receiver": 1, "organization": 1}))
            .await
            .assert_status_bad_request();

        // già membro
        server
            .post("/invitations")
            .add_header(authorization(), bearer(1))
            .json(&json!({"receiver": 3, "organization": 1}))
            .await
            .assert_status_bad_request();

        // dave ha già un invito pending per Acme
        server
            .post("/invitations")
            .add_header(authorization(), bearer(1))
            .json(&json!({"receiver": 4, "organization": 1}))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Test per PATCH /invitations/{id}/{action}
    // ============================================================

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_accept_creates_membership(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .patch("/invitations/1/accept")
            .add_header(authorization(), bearer(4))
            .await;
        response.assert_status_ok();
        let invitation: serde_json::Value = response.json();
        assert_eq!(invitation["status"], "accepted");

        server
            .get("/members/role")
            .add_query_param("organization", 1)
            .add_header(authorization(), bearer(4))
            .await
            .assert_json(&json!({"role": "member"}));

        // una seconda azione non cambia più lo stato
        let response = server
            .patch("/invitations/1/decline")
            .add_header(authorization(), bearer(4))
            .await;
        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Invitation already processed");
        assert_eq!(status_of(&pool, 1).await, "accepted");
        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_only_receiver_can_accept(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        server
            .patch("/invitations/1/accept")
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_forbidden();

        // l'owner può solo revocare
        server
            .patch("/invitations/1/accept")
            .add_header(authorization(), bearer(1))
            .await
            .assert_status_forbidden();
        assert_eq!(status_of(&pool, 1).await, "pending");
        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_owner_revokes(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        // il destinatario non può revocare
        server
            .patch("/invitations/1/revoke")
            .add_header(authorization(), bearer(4))
            .await
            .assert_status_forbidden();

        let response = server
            .patch("/invitations/1/revoke")
            .add_header(authorization(), bearer(1))
            .await;
        response.assert_status_ok();
        assert_eq!(status_of(&pool, 1).await, "revoked");
        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_terminal_invitation_rejects_actions(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        server
            .patch("/invitations/2/accept")
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_bad_request();
        assert_eq!(status_of(&pool, 2).await, "declined");

        let role: Option<String> = sqlx::query_scalar(
            "SELECT role FROM memberships WHERE user_id = 3 AND organization_id = 2",
        )
        .fetch_optional(&pool)
        .await?;
        assert_eq!(role, None);
        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_unknown_invitation_and_action(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .patch("/invitations/42/accept")
            .add_header(authorization(), bearer(4))
            .await
            .assert_status_not_found();

        server
            .patch("/invitations/1/approve")
            .add_header(authorization(), bearer(4))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Test per le liste e per DELETE
    // ============================================================

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_sent_and_received_lists(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let sent: Vec<serde_json::Value> = server
            .get("/invitations")
            .add_header(authorization(), bearer(1))
            .await
            .json();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["receiver"], 4);

        let received: Vec<serde_json::Value> = server
            .get("/invitations/received")
            .add_header(authorization(), bearer(3))
            .await
            .json();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["status"], "declined");
        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("users", "organizations", "invitations")
    ))]
    async fn test_delete_is_forbidden(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .delete("/invitations/1")
            .add_header(authorization(), bearer(1))
            .await
            .assert_status_forbidden();
        Ok(())
    }
}
