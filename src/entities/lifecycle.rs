//! Lifecycle - Tabelle di transizione per inviti e richieste di adesione
//!
//! Both workflows share the same shape: a `pending` state that can move to
//! exactly one terminal state, chosen by the action, and terminal states that
//! never move again. The tables below are the only place where those rules
//! are written down; services ask them for the next state and for which party
//! is allowed to act.

use super::enums::{InvitationStatus, JoinRequestStatus};
use serde::Deserialize;

/// Who may perform a lifecycle action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The user the invitation was sent to
    Receiver,
    /// The user who created the request
    Sender,
    /// The current owner of the target organization
    OrganizationOwner,
}

/// Returned when an action is attempted on a record that already left `pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyProcessed<S>(pub S);

pub trait Lifecycle: Copy + Sized {
    type Action: Copy;

    /// Next state for `action`, or the current state if it is terminal
    fn next(self, action: Self::Action) -> Result<Self, AlreadyProcessed<Self>>;

    fn is_terminal(self) -> bool;
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationAction {
    Accept,
    Decline,
    Revoke,
}

impl InvitationAction {
    pub fn actor(self) -> Party {
        match self {
            InvitationAction::Accept | InvitationAction::Decline => Party::Receiver,
            InvitationAction::Revoke => Party::OrganizationOwner,
        }
    }
}

impl Lifecycle for InvitationStatus {
    type Action = InvitationAction;

    fn next(self, action: InvitationAction) -> Result<Self, AlreadyProcessed<Self>> {
        match (self, action) {
            (InvitationStatus::Pending, InvitationAction::Accept) => Ok(InvitationStatus::Accepted),
            (InvitationStatus::Pending, InvitationAction::Decline) => Ok(InvitationStatus::Declined),
            (InvitationStatus::Pending, InvitationAction::Revoke) => Ok(InvitationStatus::Revoked),
            (state, _) => Err(AlreadyProcessed(state)),
        }
    }

    fn is_terminal(self) -> bool {
        self != InvitationStatus::Pending
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestAction {
    Approve,
    Reject,
    Cancel,
}

impl JoinRequestAction {
    pub fn actor(self) -> Party {
        match self {
            JoinRequestAction::Approve | JoinRequestAction::Reject => Party::OrganizationOwner,
            JoinRequestAction::Cancel => Party::Sender,
        }
    }
}

impl Lifecycle for JoinRequestStatus {
    type Action = JoinRequestAction;

    fn next(self, action: JoinRequestAction) -> Result<Self, AlreadyProcessed<Self>> {
        match (self, action) {
            (JoinRequestStatus::Pending, JoinRequestAction::Approve) => {
                Ok(JoinRequestStatus::Approved)
            }
            (JoinRequestStatus::Pending, JoinRequestAction::Reject) => {
                Ok(JoinRequestStatus::Rejected)
            }
            (JoinRequestStatus::Pending, JoinRequestAction::Cancel) => {
                Ok(JoinRequestStatus::Cancelled)
            }
            (state, _) => Err(AlreadyProcessed(state)),
        }
    }

    fn is_terminal(self) -> bool {
        self != JoinRequestStatus::Pending
    }
}
