use std::fmt;

use crate::{
    api::ApiClient,
    error::AppResult,
    model::entity::{Course, Transaction, TransactionCreate, TransactionStatus},
    notify::{Notification, Notifier},
    session::{Session, UserRole},
    state::StateError,
};

pub static ENROLL_SUCCESS_MESSAGE: &str = "Enrollment successful! Please proceed with payment.";
pub static ENROLL_FAILURE_MESSAGE: &str = "Failed to enroll in course.";

/// The viewer's enrollment in one course, derived from their latest transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrollmentStatus {
    #[default]
    None,
    Pending,
    Success,
    Failed,
}

impl From<Option<TransactionStatus>> for EnrollmentStatus {
    fn from(status: Option<TransactionStatus>) -> Self {
        match status {
            None => Self::None,
            Some(TransactionStatus::Pending) => Self::Pending,
            Some(TransactionStatus::Success) => Self::Success,
            Some(TransactionStatus::Failed) => Self::Failed,
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "not enrolled",
            Self::Pending => "pending",
            Self::Success => "enrolled",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl EnrollmentStatus {
    /// A failed enrollment may be retried.
    pub fn can_enroll(&self) -> bool {
        matches!(self, Self::None | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollButton {
    Hidden,
    Disabled(&'static str),
    Enabled(&'static str),
}

impl EnrollButton {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Hidden => None,
            Self::Disabled(label) | Self::Enabled(label) => Some(*label),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

/// Guests see an enabled button; clicking it sends them to login.
pub fn enroll_button(role: Option<UserRole>, status: EnrollmentStatus) -> EnrollButton {
    if role.is_some_and(|r| !r.can_enroll()) {
        return EnrollButton::Hidden;
    }

    match status {
        EnrollmentStatus::Pending => EnrollButton::Disabled("Awaiting confirmation"),
        EnrollmentStatus::Success => EnrollButton::Disabled("Already Enrolled"),
        EnrollmentStatus::None | EnrollmentStatus::Failed => EnrollButton::Enabled("Enroll Now"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollAction {
    RedirectToLogin,
    CreateTransaction,
}

/// What clicking the enroll button does for this viewer.
pub fn enroll_action(session: &Session, status: EnrollmentStatus) -> Result<EnrollAction, StateError> {
    match session.role() {
        None => Ok(EnrollAction::RedirectToLogin),
        Some(role) if !role.can_enroll() => Err(StateError::AdminCannotEnroll),
        Some(_) if !status.can_enroll() => Err(StateError::EnrollmentClosed(status)),
        Some(_) => Ok(EnrollAction::CreateTransaction),
    }
}

/// Creates a pending transaction for `course` and reflects it on the course.
#[tracing::instrument(skip_all, fields(course = %course.id()))]
pub async fn enroll(
    client: &ApiClient,
    course: &mut Course,
    notifier: &dyn Notifier,
) -> AppResult<Transaction> {
    match Transaction::create(client, TransactionCreate::for_course(course.id())).await {
        Ok(created) => {
            let transaction = created.data;
            course.set_transaction_status(transaction.status());
            tracing::info!(transaction = %transaction.id(), amount = transaction.amount(), "enrolled");
            notifier.notify(Notification::success(ENROLL_SUCCESS_MESSAGE));
            Ok(transaction)
        }
        Err(e) => {
            notifier.notify(Notification::from_api_error(&e, ENROLL_FAILURE_MESSAGE));
            Err(e.into())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target(&self) -> TransactionStatus {
        match self {
            Self::Approve => TransactionStatus::Success,
            Self::Reject => TransactionStatus::Failed,
        }
    }
}

/// Only pending transactions can be reviewed.
pub fn review_transition(
    current: TransactionStatus,
    decision: ReviewDecision,
) -> Result<TransactionStatus, StateError> {
    match current {
        TransactionStatus::Pending => Ok(decision.target()),
        settled => Err(StateError::TransactionNotPending(settled)),
    }
}

#[tracing::instrument(skip_all, fields(transaction = %transaction.id(), ?decision))]
pub async fn review_transaction(
    client: &ApiClient,
    transaction: &Transaction,
    decision: ReviewDecision,
    notifier: &dyn Notifier,
) -> AppResult<Transaction> {
    let target = match review_transition(transaction.status(), decision) {
        Ok(target) => target,
        Err(e) => {
            notifier.notify(Notification::failure(e.to_string()));
            return Err(e.into());
        }
    };

    match Transaction::update_status(client, transaction.id(), target).await {
        Ok(updated) => {
            tracing::info!(status = %target, "transaction reviewed");
            notifier.notify(Notification::success("Transaction status updated"));
            Ok(updated.data)
        }
        Err(e) => {
            notifier.notify(Notification::from_api_error(&e, "Failed to update status"));
            Err(e.into())
        }
    }
}
