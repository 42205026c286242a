//! JoinRequest services - Richieste di adesione inviate dagli utenti

use super::access::{find_membership, load_organization, require_owner};
use crate::core::{AppError, AppState};
use crate::dtos::{CreateJoinRequestDTO, JoinRequestDTO, RequestToJoinDTO, UpdateJoinRequestDTO};
use crate::entities::{
    JoinRequest, JoinRequestAction, JoinRequestStatus, Lifecycle, Party, User,
};
use crate::repositories::{Create, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

fn already_processed() -> AppError {
    AppError::bad_request("Request already processed")
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<RequestToJoinDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<JoinRequestDTO>), AppError> {
    let Json(body) = body?;
    let organization = load_organization(&state, body.organization).await?;

    if find_membership(&state, current_user.user_id, body.organization)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request("You are already a member of this organization"));
    }
    if state
        .join_request
        .has_pending(current_user.user_id, body.organization)
        .await?
    {
        return Err(AppError::bad_request("You already have a pending request"));
    }

    let request = state
        .join_request
        .create(&CreateJoinRequestDTO {
            sender_id: current_user.user_id,
            receiver_id: organization.owner_id,
            organization_id: organization.organization_id,
        })
        .await?;

    info!("Join request {} created", request.request_id);
    Ok((StatusCode::CREATED, Json(JoinRequestDTO::from(request))))
}

/// Richieste ricevute per le organizzazioni possedute dal chiamante
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_received_requests(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<JoinRequestDTO>>, AppError> {
    let requests = state.join_request.list_received(current_user.user_id).await?;
    debug!("Found {} received requests", requests.len());
    Ok(Json(requests.into_iter().map(JoinRequestDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_sent_requests(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<JoinRequestDTO>>, AppError> {
    let requests = state.join_request.list_sent(current_user.user_id).await?;
    Ok(Json(requests.into_iter().map(JoinRequestDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn respond_to_request(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path((request_id, action)): Path<(i64, JoinRequestAction)>,
) -> Result<Json<JoinRequestDTO>, AppError> {
    let request = state
        .join_request
        .read(&request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request not found"))?;

    match action.actor() {
        Party::Sender if request.sender_id != current_user.user_id => {
            warn!("User is not the sender of request {}", request_id);
            return Err(AppError::forbidden("You are not the sender of this request"));
        }
        Party::OrganizationOwner => {
            require_owner(&state, current_user.user_id, request.organization_id).await?;
        }
        Party::Receiver if request.receiver_id != current_user.user_id => {
            return Err(AppError::forbidden("You are not the receiver of this request"));
        }
        _ => {}
    }

    let next = request.status.next(action).map_err(|_| already_processed())?;

    let updated = match next {
        JoinRequestStatus::Approved => {
            if !state.join_request.approve(&request).await? {
                return Err(already_processed());
            }
            JoinRequest {
                status: JoinRequestStatus::Approved,
                ..request
            }
        }
        status => state
            .join_request
            .update(&request_id, &UpdateJoinRequestDTO { status })
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => already_processed(),
                other => AppError::from(other),
            })?,
    };

    info!("Request {} is now {:?}", request_id, updated.status);
    Ok(Json(JoinRequestDTO::from(updated)))
}

pub async fn delete_request() -> AppError {
    AppError::forbidden("Deletion of requests is not allowed")
}
