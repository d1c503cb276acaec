use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiResult};
use crate::impl_paginatable_for;
use crate::model::entity::{Course, User};
use crate::model::{
    DataResponse, Page, ResourceType, ResourceTyped, SuccessResponse, ViewerScopedResource,
};
use crate::query::{QueryParams, TransactionListParams};

pub static DEFAULT_PAYMENT_METHOD: &str = "Manual Transfer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Success, Self::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

/// An enrollment. `user` and `course` are snapshots taken by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    id: String,
    user: User,
    course: Course,
    amount: i64,
    status: TransactionStatus,
    payment_method: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Transaction {
    fn get_resource_type() -> ResourceType {
        ResourceType::Transaction
    }
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    /// Server-derived from the course price at enrollment time.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// The client never sends an amount; the backend prices the enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreate {
    pub course: String,
    pub payment_method: String,
}

impl TransactionCreate {
    pub fn for_course<S: Into<String>>(course_id: S) -> Self {
        Self {
            course: course_id.into(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransactionStatusUpdate {
    pub status: TransactionStatus,
}

impl Transaction {
    #[tracing::instrument(skip(client))]
    pub async fn create(
        client: &ApiClient,
        data: TransactionCreate,
    ) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        client
            .send_json(resource, Method::POST, &[resource.path()], &data)
            .await
    }

    pub async fn find_by_id(client: &ApiClient, id: &str) -> ApiResult<Self> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), id];
        let found: DataResponse<Self> = client.get(resource, &path, &[]).await?;
        Ok(found.data)
    }

    #[tracing::instrument(skip(client))]
    pub async fn update_status(
        client: &ApiClient,
        id: &str,
        status: TransactionStatus,
    ) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), id, "status"];
        client
            .send_json(resource, Method::PATCH, &path, &TransactionStatusUpdate { status })
            .await
    }

    /// The viewer's own transactions.
    pub async fn my(client: &ApiClient, params: &TransactionListParams) -> ApiResult<Page<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), "my"];
        client
            .get(resource, &path, &params.to_request_pairs())
            .await
    }

    /// The viewer's current transaction for a course, if any.
    pub async fn check(client: &ApiClient, course_id: &str) -> ApiResult<Option<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), "check", course_id];
        let found: DataResponse<Option<Self>> = client.get(resource, &path, &[]).await?;
        Ok(found.data)
    }
}

impl_paginatable_for!(Transaction, TransactionListParams);

#[async_trait::async_trait]
impl ViewerScopedResource for Transaction {
    async fn page_for_viewer(
        client: &ApiClient,
        params: &TransactionListParams,
    ) -> ApiResult<Page<Self>> {
        Self::my(client, params).await
    }
}
