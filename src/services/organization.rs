//! Organization services - CRUD delle organizzazioni (tenant)

use super::access::{ensure_visible_to, load_organization, require_owner};
use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateOrganizationDTO, OrganizationDTO, OrganizationNameDTO, PageQuery,
    UpdateOrganizationDTO, UserQuery,
};
use crate::entities::{Organization, User};
use crate::repositories::{Delete, Read, Update};
use axum::{
    Extension,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

async fn with_owner_name(
    state: &AppState,
    organization: Organization,
) -> Result<OrganizationDTO, AppError> {
    let owner = state.user.read(&organization.owner_id).await?;
    let mut dto = OrganizationDTO::from(organization);
    dto.owner_name = owner.map(|u| u.username);
    Ok(dto)
}

#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<OrganizationDTO>>, AppError> {
    let Query(page) = query?;
    let organizations = state
        .organization
        .list_accessible(
            current_user.user_id,
            page.search.as_deref(),
            PageQuery::PAGE_SIZE,
            page.offset(),
        )
        .await?;

    debug!("Found {} organizations", organizations.len());
    let organizations = try_join_all(
        organizations
            .into_iter()
            .map(|organization| with_owner_name(&state, organization)),
    )
    .await?;
    Ok(Json(organizations))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<CreateOrganizationDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<OrganizationDTO>), AppError> {
    let Json(body) = body?;
    body.validate()?;

    let organization = state
        .organization
        .create_with_owner(current_user.user_id, &body)
        .await?;

    info!("Organization {} created", organization.organization_id);
    let mut dto = OrganizationDTO::from(organization);
    dto.owner_name = Some(current_user.username);
    Ok((StatusCode::CREATED, Json(dto)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(organization_id): Path<i64>,
) -> Result<Json<OrganizationDTO>, AppError> {
    let organization = load_organization(&state, organization_id).await?;
    ensure_visible_to(&state, &organization, current_user.user_id).await?;

    Ok(Json(with_owner_name(&state, organization).await?))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(organization_id): Path<i64>,
    body: Result<Json<UpdateOrganizationDTO>, JsonRejection>,
) -> Result<Json<OrganizationDTO>, AppError> {
    let Json(body) = body?;
    body.validate()?;

    load_organization(&state, organization_id).await?;
    require_owner(&state, current_user.user_id, organization_id).await?;

    let updated = state.organization.update(&organization_id, &body).await?;
    info!("Organization updated");
    Ok(Json(with_owner_name(&state, updated).await?))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(organization_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    load_organization(&state, organization_id).await?;
    require_owner(&state, current_user.user_id, organization_id).await?;

    // memberships, inviti, richieste e quiz vengono rimossi in cascata
    state.organization.delete(&organization_id).await?;
    info!("Organization deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Organizzazioni possedute dall'utente corrente
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn my_organizations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<OrganizationNameDTO>>, AppError> {
    let owned = state.organization.find_owned_by(current_user.user_id).await?;
    Ok(Json(owned))
}

/// Organizzazioni di un altro utente; quelle nascoste solo quando si chiede per sé stessi
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn organizations_of_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Vec<OrganizationNameDTO>>, AppError> {
    let Query(query) = query?;
    let include_hidden = query.user == current_user.user_id;

    let organizations = state
        .organization
        .find_of_user(query.user, include_hidden)
        .await?;
    Ok(Json(organizations))
}
