//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod analytics;
pub mod invitation;
pub mod join_request;
pub mod membership;
pub mod notification;
pub mod organization;
pub mod query;
pub mod quiz;
pub mod user;

pub use analytics::{
    DailyScoreDTO, DynamicScoreDTO, ExportFormat, ExportOrganizationResultsQuery,
    ExportResultQuery, LastCompletionDTO, MyLastCompletionDTO, OrganizationScoreDTO,
    ResultExportDTO, ResultExportRow, UserRatingDTO,
};
pub use invitation::{CreateInvitationDTO, InvitationDTO, InviteUserDTO, UpdateInvitationDTO};
pub use join_request::{
    CreateJoinRequestDTO, JoinRequestDTO, RequestToJoinDTO, UpdateJoinRequestDTO,
};
pub use membership::{
    CreateMembershipDTO, DetailDTO, LeaveOrganizationDTO, MemberDTO, MemberTargetDTO, RoleDTO,
};
pub use notification::{CreateNotificationDTO, NotificationDTO, WsEventDTO};
pub use organization::{
    CreateOrganizationDTO, OrganizationDTO, OrganizationNameDTO, UpdateOrganizationDTO,
    UserMembershipDTO,
};
pub use query::{
    DateRangeQuery, DynamicScoresQuery, NotificationQuery, OrganizationQuery, PageQuery,
    QuizQuery, UserQuery,
};
pub use quiz::{
    CreateQuizDTO, FinishQuizDTO, NewQuestion, QuestionDTO, QuestionView, QuizDTO, QuizResultDTO,
    StartedQuizDTO, SubmittedAnswerDTO, UpdateQuizDTO, check_questions,
};
pub use user::{CreateUserDTO, LoginDTO, TokenDTO, UserDTO};
