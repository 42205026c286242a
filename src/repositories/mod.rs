//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SU SQLX ************************* //

/*
   Le query usano le funzioni runtime (`sqlx::query`, `query_as`, `query_scalar`) con
   `.bind(...)` invece delle macro `query!`: le macro richiedono un database raggiungibile
   in fase di compilazione, mentre così il crate compila ovunque e lo schema viene
   verificato dai test (`#[sqlx::test]` crea un database SQLite nuovo per ogni test e
   applica le migrations di `migrations/`).

   Le entity derivano `sqlx::FromRow`, gli enum `sqlx::Type` (testo minuscolo),
   le liste di risposte sono colonne JSON (`#[sqlx(json)]` in lettura, `Json(..)` in scrittura).

   Le date salvate dai default SQL hanno il formato 'YYYY-MM-DD HH:MM:SS', quelle scritte
   da chrono sono RFC3339: nei confronti usare sempre `datetime(col)` o `date(col)`.

   Le transizioni di stato sono `UPDATE ... WHERE status = 'pending'` (o 'started'):
   se `rows_affected() == 0` qualcun altro ha già processato la riga.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod invitation;
pub mod join_request;
pub mod membership;
pub mod notification;
pub mod organization;
pub mod quiz;
pub mod quiz_result;
pub mod quiz_session;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use invitation::InvitationRepository;
pub use join_request::JoinRequestRepository;
pub use membership::MembershipRepository;
pub use notification::NotificationRepository;
pub use organization::OrganizationRepository;
pub use quiz::QuizRepository;
pub use quiz_result::{DailyTotals, QuizResultRepository, ScoreTotals};
pub use quiz_session::QuizSessionRepository;
pub use user::UserRepository;
