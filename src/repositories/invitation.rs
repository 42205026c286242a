//! InvitationRepository - Repository per la gestione degli inviti

use super::{Create, Read, Update};
use super::membership::insert_membership;
use crate::dtos::{CreateInvitationDTO, CreateMembershipDTO, UpdateInvitationDTO};
use crate::entities::{Invitation, InvitationStatus, Role};
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const INVITATION_COLUMNS: &str =
    "invitation_id, sender_id, receiver_id, organization_id, status, created_at";

//INVITATION REPOSITORY
pub struct InvitationRepository {
    connection_pool: SqlitePool,
}

impl InvitationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// controllo prima di inviare invito, l'indice parziale resta l'ultima difesa
    pub async fn has_pending(&self, receiver_id: i64, organization_id: i64) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM invitations
            WHERE receiver_id = ? AND organization_id = ? AND status = 'pending'
            "#,
        )
        .bind(receiver_id)
        .bind(organization_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn list_sent(&self, sender_id: i64) -> Result<Vec<Invitation>, Error> {
        sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE sender_id = ? ORDER BY created_at DESC, invitation_id DESC"
        ))
        .bind(sender_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn list_received(&self, receiver_id: i64) -> Result<Vec<Invitation>, Error> {
        sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE receiver_id = ? ORDER BY created_at DESC, invitation_id DESC"
        ))
        .bind(receiver_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Accetta l'invito e crea la membership del destinatario in un'unica transazione.
    ///
    /// Ritorna `Ok(false)` se l'invito non era più `pending` (nulla viene scritto).
    pub async fn accept(&self, invitation: &Invitation) -> Result<bool, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            "UPDATE invitations SET status = ? WHERE invitation_id = ? AND status = 'pending'",
        )
        .bind(InvitationStatus::Accepted)
        .bind(invitation.invitation_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_membership(
            &mut *tx,
            &CreateMembershipDTO {
                user_id: invitation.receiver_id,
                organization_id: invitation.organization_id,
                role: Role::Member,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

impl Create<Invitation, CreateInvitationDTO> for InvitationRepository {
    async fn create(&self, data: &CreateInvitationDTO) -> Result<Invitation, Error> {
        let now = Utc::now();
        let status = InvitationStatus::Pending;

        let result = sqlx::query(
            r#"
            INSERT INTO invitations (sender_id, receiver_id, organization_id, status, created_at)
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

        Ok(Invitation {
            invitation_id: result.last_insert_rowid(),
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            organization_id: data.organization_id,
            status,
            created_at: now,
        })
    }
}

impl Read<Invitation, i64> for InvitationRepository {
    async fn read(&self, id: &i64) -> Result<Option<Invitation>, Error> {
        sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE invitation_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Invitation, UpdateInvitationDTO, i64> for InvitationRepository {
    /// Solo un invito `pending` può cambiare stato: altrimenti `RowNotFound`
    async fn update(&self, id: &i64, data: &UpdateInvitationDTO) -> Result<Invitation, Error> {
        let result = sqlx::query(
            "UPDATE invitations SET status = ? WHERE invitation_id = ? AND status = 'pending'",
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
