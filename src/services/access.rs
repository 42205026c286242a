//! Access checks - Lookup condivisi su organizzazioni e Membership Ledger
//!
//! Ogni handler che agisce su un'organizzazione passa da qui: prima l'esistenza
//! (404), poi il ruolo del chiamante (403).

use crate::core::{AppError, AppState, require_role};
use crate::entities::{Membership, Organization, Role};
use crate::repositories::Read;
use tracing::warn;

pub async fn load_organization(
    state: &AppState,
    organization_id: i64,
) -> Result<Organization, AppError> {
    state
        .organization
        .read(&organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))
}

pub async fn find_membership(
    state: &AppState,
    user_id: i64,
    organization_id: i64,
) -> Result<Option<Membership>, AppError> {
    Ok(state.membership.read(&(user_id, organization_id)).await?)
}

pub async fn require_membership(
    state: &AppState,
    user_id: i64,
    organization_id: i64,
) -> Result<Membership, AppError> {
    find_membership(state, user_id, organization_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id, organization_id, "User is not a member of the organization");
            AppError::forbidden("You are not a member of this organization")
        })
}

/// Owner dell'organizzazione secondo il ledger
pub async fn require_owner(
    state: &AppState,
    user_id: i64,
    organization_id: i64,
) -> Result<Membership, AppError> {
    let membership = require_membership(state, user_id, organization_id).await?;
    require_role(&membership, &[Role::Owner])?;
    Ok(membership)
}

/// Owner o admin: gestione quiz e statistiche
pub async fn require_manager(
    state: &AppState,
    user_id: i64,
    organization_id: i64,
) -> Result<Membership, AppError> {
    let membership = require_membership(state, user_id, organization_id).await?;
    require_role(&membership, &[Role::Owner, Role::Admin])?;
    Ok(membership)
}

/// Le organizzazioni nascoste sono leggibili solo dai loro membri
pub async fn ensure_visible_to(
    state: &AppState,
    organization: &Organization,
    user_id: i64,
) -> Result<Option<Membership>, AppError> {
    let membership = find_membership(state, user_id, organization.organization_id).await?;
    if organization.is_hidden() && membership.is_none() {
        warn!(
            user_id,
            organization_id = organization.organization_id,
            "Hidden organization requested by a non-member"
        );
        return Err(AppError::forbidden("This organization is hidden"));
    }
    Ok(membership)
}
