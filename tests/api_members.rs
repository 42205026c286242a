//! Integration tests per il membership ledger (/members)

mod common;

#[cfg(test)]
mod member_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    async fn role_of(pool: &SqlitePool, user_id: i64, organization_id: i64) -> Option<String> {
        sqlx::query_scalar("SELECT role FROM memberships WHERE user_id = ? AND organization_id = ?")
            .bind(user_id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
            .unwrap()
    }

    // ============================================================
    // Test per DELETE /members/leave
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_member_can_leave(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .delete("/members/leave")
            .add_header(authorization(), bearer(3))
            .json(&json!({"organization": 1}))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["detail"], "You have successfully left the organization");
        assert_eq!(role_of(&pool, 3, 1).await, None);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_owner_cannot_leave(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        server
            .delete("/members/leave")
            .add_header(authorization(), bearer(1))
            .json(&json!({"organization": 1}))
            .await
            .assert_status_forbidden();
        assert_eq!(role_of(&pool, 1, 1).await.as_deref(), Some("owner"));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_leave_errors(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        // dave non è membro di Acme
        server
            .delete("/members/leave")
            .add_header(authorization(), bearer(4))
            .json(&json!({"organization": 1}))
            .await
            .assert_status_not_found();

        server
            .delete("/members/leave")
            .add_header(authorization(), bearer(4))
            .json(&json!({"organization": 99}))
            .await
            .assert_status_not_found();
        Ok(())
    }

    // ============================================================
    // Test per DELETE /members/kick
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_owner_kicks_member(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        server
            .delete("/members/kick")
            .add_header(authorization(), bearer(1))
            .json(&json!({"organization": 1, "user": 3}))
            .await
            .assert_status_ok();
        assert_eq!(role_of(&pool, 3, 1).await, None);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_kick_rules(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        // un admin non può espellere
        server
            .delete("/members/kick")
            .add_header(authorization(), bearer(2))
            .json(&json!({"organization": 1, "user": 3}))
            .await
            .assert_status_forbidden();

        // l'owner non può essere espulso
        server
            .delete("/members/kick")
            .add_header(authorization(), bearer(1))
            .json(&json!({"organization": 1, "user": 1}))
            .await
            .assert_status_forbidden();

        server
            .delete("/members/kick")
            .add_header(authorization(), bearer(1))
            .json(&json!({"organization": 1, "user": 4}))
            .await
            .assert_status_not_found();

        assert_eq!(role_of(&pool, 3, 1).await.as_deref(), Some("member"));
        Ok(())
    }

    // ============================================================
    // Test per PATCH /members/appoint-admin e POST /members/remove-admin
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_appoint_and_remove_admin(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        let target = json!({"organization": 1, "user": 3});

        server
            .patch("/members/appoint-admin")
            .add_header(authorization(), bearer(1))
            .json(&target)
            .await
            .assert_status_ok();
        assert_eq!(role_of(&pool, 3, 1).await.as_deref(), Some("admin"));

        // già admin
        server
            .patch("/members/appoint-admin")
            .add_header(authorization(), bearer(1))
            .json(&target)
            .await
            .assert_status_forbidden();

        server
            .post("/members/remove-admin")
            .add_header(authorization(), bearer(1))
            .json(&target)
            .await
            .assert_status_ok();
        assert_eq!(role_of(&pool, 3, 1).await.as_deref(), Some("member"));

        // non più admin
        server
            .post("/members/remove-admin")
            .add_header(authorization(), bearer(1))
            .json(&target)
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_appoint_admin_requires_owner_and_member(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .patch("/members/appoint-admin")
            .add_header(authorization(), bearer(2))
            .json(&json!({"organization": 1, "user": 3}))
            .await
            .assert_status_forbidden();

        server
            .patch("/members/appoint-admin")
            .add_header(authorization(), bearer(1))
            .json(&json!({"organization": 1, "user": 4}))
            .await
            .assert_status_not_found();
        Ok(())
    }

    // ============================================================
    // Test per le letture del ledger
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations", "quizzes")))]
    async fn test_list_members_shows_last_quiz_to_managers(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/members/members")
            .add_query_param("organization", 1)
            .add_header(authorization(), bearer(1))
            .await;
        response.assert_status_ok();
        let members: Vec<serde_json::Value> = response.json();
        assert_eq!(members.len(), 3);
        let bob = members.iter().find(|m| m["user_id"] == 2).unwrap();
        assert_eq!(bob["role"], "admin");
        assert!(bob["last_quiz_at"].is_string());

        let members: Vec<serde_json::Value> = server
            .get("/members/members")
            .add_query_param("organization", 1)
            .add_header(authorization(), bearer(3))
            .await
            .json();
        assert!(members.iter().all(|m| m.get("last_quiz_at").is_none()));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_list_members_of_hidden_organization(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/members/members")
            .add_query_param("organization", 2)
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_forbidden();

        server
            .get("/members/members")
            .add_query_param("organization", 42)
            .add_header(authorization(), bearer(3))
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_list_admins(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let admins: Vec<serde_json::Value> = server
            .get("/members/admins")
            .add_query_param("organization", 1)
            .add_header(authorization(), bearer(3))
            .await
            .json();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0]["username"], "bob");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_my_memberships_and_role(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/members/memberships")
            .add_header(authorization(), bearer(2))
            .await;
        response.assert_json(&json!([
            {"organization": 1, "organization_name": "Acme", "role": "admin"},
            {"organization": 2, "organization_name": "Stealth", "role": "owner"}
        ]));

        server
            .get("/members/role")
            .add_query_param("organization", 2)
            .add_header(authorization(), bearer(3))
            .await
            .assert_json(&json!({"role": null}));
        Ok(())
    }

    // ============================================================
    // Operazioni generiche disabilitate
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "organizations")))]
    async fn test_generic_operations_are_disabled(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/members")
            .add_header(authorization(), bearer(1))
            .await
            .assert_status_forbidden();

        server
            .post("/members")
            .add_header(authorization(), bearer(1))
            .json(&json!({"user_id": 4, "organization_id": 1, "role": "member"}))
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);

        server
            .delete("/members/1")
            .add_header(authorization(), bearer(1))
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
        Ok(())
    }
}
