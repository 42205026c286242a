//! MembershipRepository - Membership Ledger
//!
//! Una riga per coppia (utente, organizzazione). Il vincolo "un solo owner per
//! organizzazione" è garantito da un indice unico parziale nel database.

use super::{Delete, Read};
use crate::dtos::{CreateMembershipDTO, MemberDTO, UserMembershipDTO};
use crate::entities::{Membership, Role};
use chrono::Utc;
use sqlx::{Error, SqliteConnection, SqlitePool};

pub struct MembershipRepository {
    connection_pool: SqlitePool,
}

impl MembershipRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Aggiorna il ruolo solo se quello attuale è `from`; ritorna false se nulla è cambiato
    pub async fn change_role(
        &self,
        user_id: i64,
        organization_id: i64,
        from: Role,
        to: Role,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE memberships SET role = ? WHERE user_id = ? AND organization_id = ? AND role = ?",
        )
        .bind(to)
        .bind(user_id)
        .bind(organization_id)
        .bind(from)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Membri con username e data dell'ultimo quiz completato nell'organizzazione
    pub async fn list_members(&self, organization_id: i64) -> Result<Vec<MemberDTO>, Error> {
        sqlx::query_as::<_, MemberDTO>(
            r#"
            SELECT m.user_id, m.organization_id, u.username, m.role, m.member_since,
                   (SELECT MAX(datetime(r.created_at))
                      FROM quiz_results r
                      JOIN quizzes q ON q.quiz_id = r.quiz_id
                     WHERE r.user_id = m.user_id AND q.organization_id = m.organization_id
                   ) AS last_quiz_at
            FROM memberships m
            JOIN users u ON u.user_id = m.user_id
            WHERE m.organization_id = ?
            ORDER BY m.member_since, m.user_id
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn list_with_role(
        &self,
        organization_id: i64,
        role: Role,
    ) -> Result<Vec<MemberDTO>, Error> {
        sqlx::query_as::<_, MemberDTO>(
            r#"
            SELECT m.user_id, m.organization_id, u.username, m.role, m.member_since,
                   NULL AS last_quiz_at
            FROM memberships m
            JOIN users u ON u.user_id = m.user_id
            WHERE m.organization_id = ? AND m.role = ?
            ORDER BY m.user_id
            "#,
        )
        .bind(organization_id)
        .bind(role)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<UserMembershipDTO>, Error> {
        sqlx::query_as::<_, UserMembershipDTO>(
            r#"
            SELECT m.organization_id AS organization, o.name AS organization_name, m.role
            FROM memberships m
            JOIN organizations o ON o.organization_id = m.organization_id
            WHERE m.user_id = ?
            ORDER BY m.organization_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Id di tutti i membri, usato per il fan-out delle notifiche
    pub async fn member_ids(&self, organization_id: i64) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM memberships WHERE organization_id = ? ORDER BY user_id",
        )
        .bind(organization_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

/// Unico punto di inserimento nel ledger.
///
/// Gira sulla connessione del chiamante, così l'inserimento fa parte della sua
/// transazione (creazione organizzazione, invito accettato, richiesta approvata).
pub async fn insert_membership(
    conn: &mut SqliteConnection,
    data: &CreateMembershipDTO,
) -> Result<Membership, Error> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO memberships (user_id, organization_id, role, member_since) VALUES (?, ?, ?, ?)",
    )
    .bind(data.user_id)
    .bind(data.organization_id)
    .bind(data.role)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Membership {
        user_id: data.user_id,
        organization_id: data.organization_id,
        role: data.role,
        member_since: now,
    })
}

/// Chiave: (user_id, organization_id)
impl Read<Membership, (i64, i64)> for MembershipRepository {
    async fn read(&self, id: &(i64, i64)) -> Result<Option<Membership>, Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT user_id, organization_id, role, member_since
            FROM memberships
            WHERE user_id = ? AND organization_id = ?
            "#,
        )
        .bind(id.0)
        .bind(id.1)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<(i64, i64)> for MembershipRepository {
    /// Non rimuove mai la riga dell'owner
    async fn delete(&self, id: &(i64, i64)) -> Result<(), Error> {
        let result = sqlx::query(
            "DELETE FROM memberships WHERE user_id = ? AND organization_id = ? AND role <> 'owner'",
        )
        .bind(id.0)
        .bind(id.1)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations")))]
    async fn second_owner_is_rejected_by_the_ledger(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MembershipRepository::new(pool.clone());

        // dave is not in Acme yet
        let mut conn = pool.acquire().await?;
        let inserted = insert_membership(
            &mut conn,
            &CreateMembershipDTO {
                user_id: 4,
                organization_id: 1,
                role: Role::Member,
            },
        )
        .await?;
        assert_eq!(inserted.role, Role::Member);
        drop(conn);

        let promoted = repo.change_role(4, 1, Role::Member, Role::Owner).await;
        assert!(matches!(promoted, Err(Error::Database(ref db)) if db.is_unique_violation()));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations")))]
    async fn owner_row_cannot_be_deleted(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MembershipRepository::new(pool);

        assert!(matches!(repo.delete(&(1, 1)).await, Err(Error::RowNotFound)));
        assert!(repo.read(&(1, 1)).await?.is_some());

        repo.delete(&(3, 1)).await?;
        assert!(repo.read(&(3, 1)).await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations")))]
    async fn role_change_is_conditional(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MembershipRepository::new(pool);

        assert!(repo.change_role(3, 1, Role::Member, Role::Admin).await?);
        assert!(!repo.change_role(3, 1, Role::Member, Role::Admin).await?);

        let admins = repo.list_with_role(1, Role::Admin).await?;
        let ids: Vec<i64> = admins.iter().map(|m| m.user_id).collect();
        assert_eq!(ids, vec![2, 3]);
        Ok(())
    }
}
