//! Invitation services - Inviti inviati dagli owner ai futuri membri
//!
//! Le transizioni di stato passano dalla tabella in `entities::lifecycle`, che
//! stabilisce anche chi può eseguire ciascuna azione.

use super::access::{find_membership, load_organization, require_owner};
use super::notification::fan_out;
use crate::core::{AppError, AppState};
use crate::dtos::{CreateInvitationDTO, InvitationDTO, InviteUserDTO, UpdateInvitationDTO};
use crate::entities::{
    Invitation, InvitationAction, InvitationStatus, Lifecycle, Party, User,
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
    AppError::bad_request("Invitation already processed")
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    body: Result<Json<InviteUserDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<InvitationDTO>), AppError> {
    // 1. L'organizzazione deve esistere e il mittente deve esserne l'owner
    // 2. Il destinatario deve esistere, essere diverso dal mittente e non già membro
    // 3. Al più un invito pending per (destinatario, organizzazione)
    // 4. Salvare l'invito e notificare il destinatario
    let Json(body) = body?;
    let organization = load_organization(&state, body.organization).await?;
    require_owner(&state, current_user.user_id, body.organization).await?;

    if state.user.read(&body.receiver).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    if body.receiver == current_user.user_id {
        return Err(AppError::bad_request("You cannot invite yourself"));
    }
    if find_membership(&state, body.receiver, body.organization)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request("User is already a member of this organization"));
    }
    if state
        .invitation
        .has_pending(body.receiver, body.organization)
        .await?
    {
        return Err(AppError::bad_request("User already has a pending invitation"));
    }

    let invitation = state
        .invitation
        .create(&CreateInvitationDTO {
            sender_id: current_user.user_id,
            receiver_id: body.receiver,
            organization_id: body.organization,
        })
        .await?;
    info!("Invitation {} created", invitation.invitation_id);

    // l'invito è già salvato: una notifica mancata non lo annulla
    if let Err(e) = fan_out(
        &state,
        &[body.receiver],
        &format!(
            "{} invited you to join {}",
            current_user.username, organization.name
        ),
    )
    .await
    {
        warn!(
            invitation_id = invitation.invitation_id,
            "Failed to notify the receiver: {}",
            e.message()
        );
    }

    Ok((StatusCode::CREATED, Json(InvitationDTO::from(invitation))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_sent_invitations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<InvitationDTO>>, AppError> {
    let invitations = state.invitation.list_sent(current_user.user_id).await?;
    debug!("Found {} sent invitations", invitations.len());
    Ok(Json(invitations.into_iter().map(InvitationDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_received_invitations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<InvitationDTO>>, AppError> {
    let invitations = state.invitation.list_received(current_user.user_id).await?;
    debug!("Found {} received invitations", invitations.len());
    Ok(Json(invitations.into_iter().map(InvitationDTO::from).collect()))
}

async fn check_actor(
    state: &AppState,
    invitation: &Invitation,
    action: InvitationAction,
    user_id: i64,
) -> Result<(), AppError> {
    match action.actor() {
        Party::Receiver if invitation.receiver_id == user_id => Ok(()),
        Party::Receiver => {
            warn!("User is not the receiver of invitation {}", invitation.invitation_id);
            Err(AppError::forbidden("You are not the receiver of this invitation"))
        }
        Party::OrganizationOwner => require_owner(state, user_id, invitation.organization_id)
            .await
            .map(|_| ()),
        Party::Sender if invitation.sender_id == user_id => Ok(()),
        Party::Sender => Err(AppError::forbidden("You are not the sender of this invitation")),
    }
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn respond_to_invitation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path((invitation_id, action)): Path<(i64, InvitationAction)>,
) -> Result<Json<InvitationDTO>, AppError> {
    // 1. 404 se l'invito non esiste
    // 2. 403 se il chiamante non è la parte autorizzata per l'azione
    // 3. 400 se l'invito non è più pending (lo stato non cambia)
    // 4. accept crea la membership nella stessa transazione del cambio di stato
    let invitation = state
        .invitation
        .read(&invitation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation not found"))?;

    check_actor(&state, &invitation, action, current_user.user_id).await?;

    let next = invitation
        .status
        .next(action)
        .map_err(|_| already_processed())?;

    let updated = match next {
        InvitationStatus::Accepted => {
            if !state.invitation.accept(&invitation).await? {
                return Err(already_processed());
            }
            Invitation {
                status: InvitationStatus::Accepted,
                ..invitation
            }
        }
        status => state
            .invitation
            .update(&invitation_id, &UpdateInvitationDTO { status })
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => already_processed(),
                other => AppError::from(other),
            })?,
    };

    info!("Invitation {} is now {:?}", invitation_id, updated.status);
    Ok(Json(InvitationDTO::from(updated)))
}

pub async fn delete_invitation() -> AppError {
    AppError::forbidden("Deletion of invitations is not allowed")
}
