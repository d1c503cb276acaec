//! Create / edit forms with client-side validation.
//!
//! A form is validated locally first; only a valid form reaches the backend.
//! Backend answers (success or failure) are reported through a [`Notifier`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    api::{ApiClient, ApiResult},
    error::AppResult,
    model::SuccessResponse,
    notify::{Notification, Notifier},
};

mod auth;
mod category;
mod course;
mod lesson;

pub use auth::LoginForm;
pub use category::CategoryForm;
pub use course::CourseForm;
pub use lesson::LessonForm;

/// Field name to message, one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message reported for `field`.
    pub fn add<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
pub trait EntityForm: Send + Sync {
    type Output: Send;

    /// Shown when the backend fails without a message.
    const FAILURE_MESSAGE: &'static str;

    fn validate(&self) -> Result<(), ValidationErrors>;

    fn success_message(&self) -> &'static str;

    /// Creates or updates depending on whether the form edits an existing entity.
    async fn send(self, client: &ApiClient) -> ApiResult<SuccessResponse<Self::Output>>;
}

/// Validates, sends, and reports the outcome. Validation errors are returned
/// for inline display and never reach the backend.
pub async fn submit_form<F: EntityForm>(
    client: &ApiClient,
    form: F,
    notifier: &dyn Notifier,
) -> AppResult<F::Output> {
    form.validate()?;
    let success = form.success_message();

    match form.send(client).await {
        Ok(response) => {
            tracing::info!(backend = %response.message, "{success}");
            notifier.notify(Notification::success(success));
            Ok(response.data)
        }
        Err(e) => {
            notifier.notify(Notification::from_api_error(&e, F::FAILURE_MESSAGE));
            Err(e.into())
        }
    }
}
