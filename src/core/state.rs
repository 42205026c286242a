//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::repositories::{
    InvitationRepository, JoinRequestRepository, MembershipRepository, NotificationRepository,
    OrganizationRepository, QuizRepository, QuizResultRepository, QuizSessionRepository,
    UserRepository,
};
use crate::ws::usermap::UserMap;
use sqlx::SqlitePool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione delle organizzazioni
    pub organization: OrganizationRepository,

    /// Membership Ledger: ruoli degli utenti nelle organizzazioni
    pub membership: MembershipRepository,

    /// Inviti inviati dagli owner
    pub invitation: InvitationRepository,

    /// Richieste di adesione inviate dagli utenti
    pub join_request: JoinRequestRepository,

    pub quiz: QuizRepository,
    pub session: QuizSessionRepository,
    pub result: QuizResultRepository,
    pub notification: NotificationRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Mappa concorrente degli utenti online con i loro canali WebSocket
    /// Key: user_id, Value: Sender per inviare notifiche al WebSocket dell'utente
    pub users_online: UserMap,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    pub fn new(pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            organization: OrganizationRepository::new(pool.clone()),
            membership: MembershipRepository::new(pool.clone()),
            invitation: InvitationRepository::new(pool.clone()),
            join_request: JoinRequestRepository::new(pool.clone()),
            quiz: QuizRepository::new(pool.clone()),
            session: QuizSessionRepository::new(pool.clone()),
            result: QuizResultRepository::new(pool.clone()),
            notification: NotificationRepository::new(pool),
            jwt_secret,
            users_online: UserMap::new(),
        }
    }
}
