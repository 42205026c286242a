//! OrganizationRepository - Repository per le organizzazioni (tenant)

use super::{Delete, Read, Update};
use super::membership::insert_membership;
use crate::dtos::{
    CreateMembershipDTO, CreateOrganizationDTO, OrganizationNameDTO, UpdateOrganizationDTO,
};
use crate::entities::{Organization, Role};
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const ORGANIZATION_COLUMNS: &str =
    "organization_id, name, description, owner_id, visibility, created_at";

pub struct OrganizationRepository {
    connection_pool: SqlitePool,
}

impl OrganizationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Crea l'organizzazione e la membership `owner` del creatore nella stessa transazione
    pub async fn create_with_owner(
        &self,
        owner_id: i64,
        data: &CreateOrganizationDTO,
    ) -> Result<Organization, Error> {
        let now = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO organizations (name, description, owner_id, visibility, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(owner_id)
        .bind(data.visibility)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let organization_id = result.last_insert_rowid();

        insert_membership(
            &mut *tx,
            &CreateMembershipDTO {
                user_id: owner_id,
                organization_id,
                role: Role::Owner,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(Organization {
            organization_id,
            name: data.name.clone(),
            description: data.description.clone(),
            owner_id,
            visibility: data.visibility,
            created_at: now,
        })
    }

    /// Organizzazioni visibili più quelle (anche nascoste) di cui l'utente fa parte
    pub async fn list_accessible(
        &self,
        user_id: i64,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Organization>, Error> {
        let pattern = format!("%{}%", search.unwrap_or_default());
        sqlx::query_as::<_, Organization>(&format!(
            r#"
            SELECT {ORGANIZATION_COLUMNS} FROM organizations o
            WHERE (o.visibility = 'visible'
                   OR o.owner_id = ?
                   OR o.organization_id IN (SELECT organization_id FROM memberships WHERE user_id = ?))
              AND o.name LIKE ?
            ORDER BY o.organization_id
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(user_id)
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn find_owned_by(&self, user_id: i64) -> Result<Vec<OrganizationNameDTO>, Error> {
        sqlx::query_as::<_, OrganizationNameDTO>(
            "SELECT organization_id AS id, name FROM organizations WHERE owner_id = ? ORDER BY organization_id",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Organizzazioni di `user_id`; quelle nascoste solo se `include_hidden`
    pub async fn find_of_user(
        &self,
        user_id: i64,
        include_hidden: bool,
    ) -> Result<Vec<OrganizationNameDTO>, Error> {
        sqlx::query_as::<_, OrganizationNameDTO>(
            r#"
            SELECT o.organization_id AS id, o.name FROM organizations o
            WHERE (o.owner_id = ?
                   OR o.organization_id IN (SELECT organization_id FROM memberships WHERE user_id = ?))
              AND (? OR o.visibility = 'visible')
            ORDER BY o.organization_id
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(include_hidden)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Read<Organization, i64> for OrganizationRepository {
    async fn read(&self, id: &i64) -> Result<Option<Organization>, Error> {
        sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE organization_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Organization, UpdateOrganizationDTO, i64> for OrganizationRepository {
    async fn update(&self, id: &i64, data: &UpdateOrganizationDTO) -> Result<Organization, Error> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                visibility = COALESCE(?, visibility)
            WHERE organization_id = ?
            "#,
        )
        .bind(data.name.as_deref())
        .bind(data.description.as_deref())
        .bind(data.visibility)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for OrganizationRepository {
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE organization_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
