//! Integration tests per le richieste di adesione (/requests)
//!
//! Fixtures: richiesta 1 charlie -> Stealth (pending, riceve bob),
//! richiesta 2 dave -> Acme (rejected, riceve alice).

mod common;

#[cfg(test)]
mod request_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    async fn status_of(pool: &SqlitePool, request_id: i64) -> String {
        sqlx::query_scalar("SELECT status FROM join_requests WHERE request_id = ?")
            .bind(request_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "requests")))]
    async fn test_create_request_targets_owner(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/requests")
            .add_header(authorization(), bearer(4))
            .json(&json!({"organization": 1}))
            .await;

        // la richiesta precedente è stata rifiutata, se ne può fare una nuova
        response.assert_status(StatusCode::CREATED);
        let request: serde_json::Value = response.json();
        assert_eq!(request["sender"], 4);
        assert_eq!(request["receiver"], 1);
        assert_eq!(request["status"], "pending");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "requests")))]
    async fn test_create_request_checks(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/requests")
            .add_header(authorization(), bearer(4))
            .json(&json!({"organization": 99}))
            .await
            .assert_status_not_found();

        // già membro
        server
            .post("/requests")
            .add_header(authorization(), bearer(3))
            .json(&json!({"organization": 1}))
            .await
            .assert_status_bad_request();

        // già pending
        server
            .post("/requests")
            .add_header(authorization(), bearer(3))
            .json(&json!({"organization": 2}))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "requests")))]
    async fn test_owner_approves(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        // charlie non può approvare la propria richiesta
        server
            .patch("/requests/1/approve")
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_forbidden();

        let response = server
            .patch("/requests/1/approve")
            .add_header(authorization(), bearer(2))
            .await;
        response.assert_status_ok();
        let request: serde_json::Value = response.json();
        assert_eq!(request["status"], "approved");

        server
            .get("/members/role")
            .add_query_param("organization", 2)
            .add_header(authorization(), bearer(3))
            .await
            .assert_json(&json!({"role": "member"}));

        let response = server
            .patch("/requests/1/reject")
            .add_header(authorization(), bearer(2))
            .await;
        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Request already processed");
        assert_eq!(status_of(&pool, 1).await, "approved");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "requests")))]
    async fn test_sender_cancels(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        // l'owner non può annullare
        server
            .patch("/requests/1/cancel")
            .add_header(authorization(), bearer(2))
            .await
            .assert_status_forbidden();

        server
            .patch("/requests/1/cancel")
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_ok();
        assert_eq!(status_of(&pool, 1).await, "cancelled");

        let members: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM memberships WHERE organization_id = 2")
                .fetch_one(&pool)
                .await?;
        assert_eq!(members, 2);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "requests")))]
    async fn test_rejected_request_stays_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        server
            .patch("/requests/2/approve")
            .add_header(authorization(), bearer(1))
            .await
            .assert_status_bad_request();
        assert_eq!(status_of(&pool, 2).await, "rejected");

        server
            .patch("/requests/42/approve")
            .add_header(authorization(), bearer(1))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "requests")))]
    async fn test_lists_and_delete(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let received: Vec<serde_json::Value> = server
            .get("/requests")
            .add_header(authorization(), bearer(2))
            .await
            .json();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["sender"], 3);

        let sent: Vec<serde_json::Value> = server
            .get("/requests/sent")
            .add_header(authorization(), bearer(4))
            .await
            .json();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["status"], "rejected");

        server
            .delete("/requests/1")
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_forbidden();
        Ok(())
    }
}
