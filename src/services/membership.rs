//! Membership services - Membri e ruoli delle organizzazioni

use super::access::{ensure_visible_to, find_membership, load_organization, require_owner};
use crate::core::{AppError, AppState};
use crate::dtos::{
    DetailDTO, LeaveOrganizationDTO, MemberDTO, MemberTargetDTO, OrganizationQuery, RoleDTO,
    UserMembershipDTO,
};
use crate::entities::{Role, User};
use crate::repositories::Delete;
use axum::{
    Extension,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn leave_organization(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<LeaveOrganizationDTO>, JsonRejection>,
) -> Result<Json<DetailDTO>, AppError> {
    // 1. L'organizzazione deve esistere (404)
    // 2. L'owner non può lasciare la propria organizzazione (403)
    // 3. Chi non è membro riceve 404
    let Json(body) = body?;
    let organization = load_organization(&state, body.organization).await?;

    if organization.owner_id == current_user.user_id {
        warn!("Owner tried to leave the organization");
        return Err(AppError::forbidden("Owner cannot leave the organization"));
    }

    let membership = find_membership(&state, current_user.user_id, body.organization)
        .await?
        .ok_or_else(|| AppError::not_found("You are not a member of this organization"))?;
    if membership.role == Role::Owner {
        return Err(AppError::forbidden("Owner cannot leave the organization"));
    }

    state
        .membership
        .delete(&(current_user.user_id, body.organization))
        .await?;

    info!("User left organization {}", body.organization);
    Ok(Json(DetailDTO::new("You have successfully left the organization")))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn kick_member(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<MemberTargetDTO>, JsonRejection>,
) -> Result<Json<DetailDTO>, AppError> {
    // 1. Organizzazione esistente, chiamante owner
    // 2. L'owner non può essere rimosso (403)
    // 3. Il target deve essere membro (404)
    let Json(body) = body?;
    let organization = load_organization(&state, body.organization).await?;
    require_owner(&state, current_user.user_id, body.organization).await?;

    if organization.owner_id == body.user {
        return Err(AppError::forbidden("You cannot kick the owner of the organization"));
    }

    let target = find_membership(&state, body.user, body.organization)
        .await?
        .ok_or_else(|| AppError::not_found("User is not a member of this organization"))?;
    if target.role == Role::Owner {
        return Err(AppError::forbidden("You cannot kick the owner of the organization"));
    }

    state.membership.delete(&(body.user, body.organization)).await?;

    info!("User {} kicked from organization {}", body.user, body.organization);
    Ok(Json(DetailDTO::new("User has been removed from the organization")))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn appoint_admin(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<MemberTargetDTO>, JsonRejection>,
) -> Result<Json<DetailDTO>, AppError> {
    let Json(body) = body?;
    load_organization(&state, body.organization).await?;
    require_owner(&state, current_user.user_id, body.organization).await?;

    let target = find_membership(&state, body.user, body.organization)
        .await?
        .ok_or_else(|| AppError::not_found("User is not a member of this organization"))?;
    if target.role != Role::Member {
        return Err(AppError::forbidden("This user is already an admin or owner"));
    }

    if !state
        .membership
        .change_role(body.user, body.organization, Role::Member, Role::Admin)
        .await?
    {
        return Err(AppError::forbidden("This user is already an admin or owner"));
    }

    info!("User {} appointed admin", body.user);
    Ok(Json(DetailDTO::new("User has been appointed as admin")))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn remove_admin(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<MemberTargetDTO>, JsonRejection>,
) -> Result<Json<DetailDTO>, AppError> {
    let Json(body) = body?;
    load_organization(&state, body.organization).await?;
    require_owner(&state, current_user.user_id, body.organization).await?;

    let target = find_membership(&state, body.user, body.organization)
        .await?
        .ok_or_else(|| AppError::not_found("User is not a member of this organization"))?;
    if target.role != Role::Admin
        || !state
            .membership
            .change_role(body.user, body.organization, Role::Admin, Role::Member)
            .await?
    {
        return Err(AppError::bad_request("This user is not an admin"));
    }

    info!("Admin role removed from user {}", body.user);
    Ok(Json(DetailDTO::new("Admin role has been removed from the user")))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> Result<Json<Vec<MemberDTO>>, AppError> {
    // 1. 404 se l'organizzazione non esiste
    // 2. 403 se è nascosta e il chiamante non è membro
    // 3. admin e owner vedono anche l'ultimo quiz completato da ciascun membro
    let Query(query) = query?;
    let organization = load_organization(&state, query.organization).await?;
    let caller = ensure_visible_to(&state, &organization, current_user.user_id).await?;

    let mut members = state.membership.list_members(query.organization).await?;
    let is_manager = caller.is_some_and(|m| m.role.can_manage_quizzes());
    if !is_manager {
        members.iter_mut().for_each(|m| m.last_quiz_at = None);
    }

    debug!("Found {} members", members.len());
    Ok(Json(members))
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> Result<Json<Vec<MemberDTO>>, AppError> {
    let Query(query) = query?;
    let organization = load_organization(&state, query.organization).await?;
    ensure_visible_to(&state, &organization, current_user.user_id).await?;

    let admins = state
        .membership
        .list_with_role(query.organization, Role::Admin)
        .await?;
    Ok(Json(admins))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn my_memberships(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<UserMembershipDTO>>, AppError> {
    let memberships = state.membership.list_for_user(current_user.user_id).await?;
    Ok(Json(memberships))
}

/// `{"role": null}` quando il chiamante non è membro
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn my_role(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> Result<Json<RoleDTO>, AppError> {
    let Query(query) = query?;
    let membership = find_membership(&state, current_user.user_id, query.organization).await?;
    Ok(Json(RoleDTO::from(membership)))
}

// Operazioni generiche disabilitate: il ledger si modifica solo tramite i flussi dedicati

pub async fn list_all_memberships() -> AppError {
    AppError::forbidden("This endpoint is not available. Use the members endpoint instead")
}

pub async fn create_membership() -> AppError {
    AppError::method_not_allowed("Memberships are created through invitations and requests")
}

pub async fn delete_membership() -> AppError {
    AppError::method_not_allowed("Direct deletion is not allowed. Use the leave endpoint instead")
}
