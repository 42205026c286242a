//! JoinRequestRepository - Richieste di adesione alle organizzazioni

use super::{Create, Read, Update};
use super::membership::insert_membership;
use crate::dtos::{CreateJoinRequestDTO, CreateMembershipDTO, UpdateJoinRequestDTO};
use crate::entities::{JoinRequest, JoinRequestStatus, Role};
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const REQUEST_COLUMNS: &str =
    "request_id, sender_id, receiver_id, organization_id, status, created_at";

pub struct JoinRequestRepository {
    connection_pool: SqlitePool,
}

impl JoinRequestRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn has_pending(&self, sender_id: i64, organization_id: i64) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM join_requests
            WHERE sender_id = ? AND organization_id = ? AND status = 'pending'
            "#,
        )
        .bind(sender_id)
        .bind(organization_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn list_sent(&self, sender_id: i64) -> Result<Vec<JoinRequest>, Error> {
        sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM join_requests WHERE sender_id = ? ORDER BY created_at DESC, request_id DESC"
        ))
        .bind(sender_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Richieste per le organizzazioni possedute oggi da `owner_id`
    pub async fn list_received(&self, owner_id: i64) -> Result<Vec<JoinRequest>, Error> {
        sqlx::query_as::<_, JoinRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM join_requests
            WHERE organization_id IN (SELECT organization_id FROM organizations WHERE owner_id = ?)
            ORDER BY created_at DESC, request_id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Approva la richiesta e crea la membership del mittente nella stessa transazione.
    ///
    /// `Ok(false)` se la richiesta era già stata processata.
    pub async fn approve(&self, request: &JoinRequest) -> Result<bool, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            "UPDATE join_requests SET status = ? WHERE request_id = ? AND status = 'pending'",
        )
        .bind(JoinRequestStatus::Approved)
        .bind(request.request_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_membership(
            &mut *tx,
            &CreateMembershipDTO {
                user_id: request.sender_id,
                organization_id: request.organization_id,
                role: Role::Member,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

impl Create<JoinRequest, CreateJoinRequestDTO> for JoinRequestRepository {
    async fn create(&self, data: &CreateJoinRequestDTO) -> Result<JoinRequest, Error> {
        let now = Utc::now();
        let status = JoinRequestStatus::Pending;

        let result = sqlx::query(
            r#"
            INSERT INTO join_requests (sender_id, receiver_id, organization_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .bind(data.organization_id)
        .bind(status)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(JoinRequest {
            request_id: result.last_insert_rowid(),
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            organization_id: data.organization_id,
            status,
            created_at: now,
        })
    }
}

impl Read<JoinRequest, i64> for JoinRequestRepository {
    async fn read(&self, id: &i64) -> Result<Option<JoinRequest>, Error> {
        sqlx::query_as::<_, JoinRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM join_requests WHERE request_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<JoinRequest, UpdateJoinRequestDTO, i64> for JoinRequestRepository {
    async fn update(&self, id: &i64, data: &UpdateJoinRequestDTO) -> Result<JoinRequest, Error> {
        let result = sqlx::query(
            "UPDATE join_requests SET status = ? WHERE request_id = ? AND status = 'pending'",
        )
        .bind(data.status)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
