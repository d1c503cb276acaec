//! Client-side state machines shared by the screens.

use thiserror::Error;

use crate::model::entity::TransactionStatus;

pub mod debounce;
pub mod enrollment;
pub mod list;
pub mod progress;
pub mod sequencer;

pub use debounce::Debouncer;
pub use enrollment::{
    EnrollAction, EnrollButton, EnrollmentStatus, ReviewDecision, enroll, enroll_action,
    enroll_button, review_transaction, review_transition,
};
pub use list::{
    FetchOutcome, ListMode, ListQuery, ListSnapshot, PageSource, ResourceSource, ViewerSource,
};
pub use progress::{CompletionOutcome, LessonProgressTracker, LessonState, ProgressApi};
pub use sequencer::{RequestSequencer, Ticket};

/// A transition refused locally, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("transaction is already {0}")]
    TransactionNotPending(TransactionStatus),
    #[error("course is already {0}")]
    EnrollmentClosed(EnrollmentStatus),
    #[error("admins cannot enroll in courses")]
    AdminCannotEnroll,
    #[error("course has no lessons")]
    NoCurrentLesson,
    #[error("course is locked until it is purchased")]
    CourseLocked,
}
