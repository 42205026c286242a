//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod access;
pub mod analytics;
pub mod auth;
pub mod invitation;
pub mod join_request;
pub mod membership;
pub mod notification;
pub mod organization;
pub mod quiz;

// Re-exports per facilitare l'import
pub use analytics::{
    dynamic_scores, export_organization_results, export_result, my_dynamic_scores,
    my_last_completions, organization_score, quiz_last_completions, user_rating,
};
pub use auth::{login_user, register_user};
pub use invitation::{
    create_invitation, delete_invitation, list_received_invitations, list_sent_invitations,
    respond_to_invitation,
};
pub use join_request::{
    create_request, delete_request, list_received_requests, list_sent_requests,
    respond_to_request,
};
pub use membership::{
    appoint_admin, create_membership, delete_membership, kick_member, leave_organization,
    list_admins, list_all_memberships, list_members, my_memberships, my_role, remove_admin,
};
pub use notification::{
    create_notification, delete_notification, fan_out, list_notifications, mark_as_read,
};
pub use organization::{
    create_organization, delete_organization, get_organization, list_organizations,
    my_organizations, organizations_of_user, update_organization,
};
pub use quiz::{
    create_quiz, delete_quiz, finish_quiz, get_quiz, list_quizzes, organization_quizzes,
    start_quiz, update_quiz,
};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
