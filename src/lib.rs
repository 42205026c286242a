//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod reminders;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/organizations", configure_organization_routes(state.clone()))
        .nest("/members", configure_member_routes(state.clone()))
        .nest("/invitations", configure_invitation_routes(state.clone()))
        .nest("/requests", configure_request_routes(state.clone()))
        .nest("/quizzes", configure_quiz_routes(state.clone()))
        .nest("/analytics", configure_analytics_routes(state.clone()))
        .nest("/notifications", configure_notification_routes(state.clone()))
        // il token arriva in query string, l'handler lo verifica prima dell'upgrade
        .route("/ws/notifications", get(ws_handler))
        .with_state(state)
}

/// Aggiunge il middleware di autenticazione a un gruppo di routes
fn authenticated(state: Arc<AppState>, router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;

    router.layer(middleware::from_fn_with_state(
        state,
        authentication_middleware,
    ))
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes per la gestione delle organizzazioni
fn configure_organization_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/mine", get(my_organizations))
        .route("/of-user", get(organizations_of_user))
        .route(
            "/{organization_id}",
            get(get_organization)
                .patch(update_organization)
                .delete(delete_organization),
        );
    authenticated(state, router)
}

/// Configura le routes del membership ledger
fn configure_member_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_all_memberships).post(create_membership))
        .route("/leave", delete(leave_organization))
        .route("/kick", delete(kick_member))
        .route("/appoint-admin", patch(appoint_admin))
        .route("/remove-admin", post(remove_admin))
        .route("/members", get(list_members))
        .route("/admins", get(list_admins))
        .route("/memberships", get(my_memberships))
        .route("/role", get(my_role))
        .route("/{membership_id}", delete(delete_membership));
    authenticated(state, router)
}

/// Configura le routes per la gestione degli inviti
fn configure_invitation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_sent_invitations).post(create_invitation))
        .route("/received", get(list_received_invitations))
        .route("/{invitation_id}", delete(delete_invitation))
        .route("/{invitation_id}/{action}", patch(respond_to_invitation));
    authenticated(state, router)
}

/// Configura le routes per le richieste di adesione
fn configure_request_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_received_requests).post(create_request))
        .route("/sent", get(list_sent_requests))
        .route("/{request_id}", delete(delete_request))
        .route("/{request_id}/{action}", patch(respond_to_request));
    authenticated(state, router)
}

/// Configura le routes dei quiz e delle sessioni
fn configure_quiz_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/organization", get(organization_quizzes))
        .route("/start-quiz", get(start_quiz))
        .route("/finish-quiz", post(finish_quiz))
        .route(
            "/{quiz_id}",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        );
    authenticated(state, router)
}

/// Configura le routes delle statistiche
fn configure_analytics_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/organization-score", get(organization_score))
        .route("/user-rating", get(user_rating))
        .route("/dynamic-scores", get(dynamic_scores))
        .route("/my-dynamic-scores", get(my_dynamic_scores))
        .route("/quiz-last-completions", get(quiz_last_completions))
        .route("/my-last-completions", get(my_last_completions))
        .route("/export-result", get(export_result))
        .route("/export-organization-results", get(export_organization_results));
    authenticated(state, router)
}

/// Configura le routes delle notifiche
fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let router = Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/mark-as-read", patch(mark_as_read))
        .route("/{notification_id}", delete(delete_notification));
    authenticated(state, router)
}
