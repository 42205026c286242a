//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod enums;
pub mod invitation;
pub mod join_request;
pub mod lifecycle;
pub mod membership;
pub mod notification;
pub mod organization;
pub mod quiz;
pub mod quiz_result;
pub mod quiz_session;
pub mod user;

// Re-exports per facilitare l'import
pub use enums::{
    InvitationStatus, JoinRequestStatus, NotificationStatus, Role, SessionStatus, Visibility,
};
pub use invitation::Invitation;
pub use join_request::JoinRequest;
pub use lifecycle::{AlreadyProcessed, InvitationAction, JoinRequestAction, Lifecycle, Party};
pub use membership::Membership;
pub use notification::Notification;
pub use organization::Organization;
pub use quiz::{Question, Quiz, count_correct};
pub use quiz_result::{QuizResult, percentage};
pub use quiz_session::QuizSession;
pub use user::User;
