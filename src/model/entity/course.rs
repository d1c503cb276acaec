use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, multipart::Form};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiResult};
use crate::impl_paginatable_for;
use crate::model::entity::{Category, TransactionStatus};
use crate::model::{
    CrudResource, DataResponse, Page, ResourceType, ResourceTyped, SuccessResponse,
    ViewerScopedResource,
};
use crate::query::{CourseListParams, QueryParams};
use crate::state::EnrollmentStatus;
use crate::utils::files::Upload;

/// A course either references its category by id or embeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Embedded(Category),
    Id(String),
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Embedded(category) => category.id(),
            Self::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Embedded(category) => Some(category.name()),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    description: String,
    instructor: String,
    price: i64,
    category: CategoryRef,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    goals: Vec<String>,
    #[serde(default)]
    is_purchased: Option<bool>,
    #[serde(default)]
    transaction_status: Option<TransactionStatus>,
    #[serde(default)]
    completed_lessons_count: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> ResourceType {
        ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructor(&self) -> &str {
        &self.instructor
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn category(&self) -> &CategoryRef {
        &self.category
    }

    pub fn thumbnail_url(&self) -> &str {
        &self.thumbnail_url
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn is_purchased(&self) -> bool {
        self.is_purchased.unwrap_or(false)
    }

    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        self.transaction_status
    }

    pub fn completed_lessons_count(&self) -> u32 {
        self.completed_lessons_count.unwrap_or(0)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_free(&self) -> bool {
        self.price <= 0
    }

    /// Paid and not yet purchased: lessons stay closed.
    pub fn is_locked(&self) -> bool {
        !self.is_free() && !self.is_purchased()
    }

    pub fn enrollment_status(&self) -> EnrollmentStatus {
        EnrollmentStatus::from(self.transaction_status)
    }

    /// Reflects a freshly created or reviewed transaction locally.
    pub fn set_transaction_status(&mut self, status: TransactionStatus) {
        self.transaction_status = Some(status);
        if status == TransactionStatus::Success {
            self.is_purchased = Some(true);
        }
    }
}

/// Course fields for create and update. The thumbnail is optional on update.
#[derive(Debug, Clone, Default)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub price: i64,
    pub category: String,
    pub goals: Vec<String>,
    pub thumbnail: Option<Upload>,
}

impl CourseCreate {
    pub fn into_form(self) -> ApiResult<Form> {
        let mut form = Form::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("instructor", self.instructor)
            .text("price", self.price.to_string())
            .text("category", self.category);

        for goal in self.goals {
            form = form.text("goals[]", goal);
        }

        if let Some(thumbnail) = self.thumbnail {
            form = form.part("thumbnail", thumbnail.into_part()?);
        }

        Ok(form)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_courses: u32,
    pub completed_courses: u32,
    pub total_transactions: u32,
}

#[async_trait]
impl CrudResource<CourseCreate, CourseCreate> for Course {
    #[tracing::instrument(skip_all, fields(title = %data.title))]
    async fn create(client: &ApiClient, data: CourseCreate) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        let form = data.into_form()?;
        client
            .send_multipart(resource, Method::POST, &[resource.path()], form)
            .await
    }

    #[tracing::instrument(skip(client, data))]
    async fn update(
        client: &ApiClient,
        id: &str,
        data: CourseCreate,
    ) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), id];
        let form = data.into_form()?;
        client.send_multipart(resource, Method::PUT, &path, form).await
    }
}

impl Course {
    /// Courses the signed-in user has enrolled in.
    pub async fn my_courses(
        client: &ApiClient,
        params: &CourseListParams,
    ) -> ApiResult<Page<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), "my"];
        client
            .get(resource, &path, &params.to_request_pairs())
            .await
    }

    pub async fn stats(client: &ApiClient) -> ApiResult<UserStats> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), "stats"];
        let stats: DataResponse<UserStats> = client.get(resource, &path, &[]).await?;
        Ok(stats.data)
    }
}

impl_paginatable_for!(Course, CourseListParams);

#[async_trait]
impl ViewerScopedResource for Course {
    async fn page_for_viewer(client: &ApiClient, params: &CourseListParams) -> ApiResult<Page<Self>> {
        Self::my_courses(client, params).await
    }
}
