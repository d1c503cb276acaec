use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiResult};
use crate::impl_paginatable_for;
use crate::model::{CrudResource, PaginatableResource, ResourceType, ResourceTyped, SuccessResponse};
use crate::query::LessonListParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(rename = "_id")]
    id: String,
    course: String,
    title: String,
    content: String,
    order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> ResourceType {
        ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonCreate {
    pub course: String,
    pub title: String,
    pub content: String,
    pub order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[async_trait]
impl CrudResource<LessonCreate, LessonUpdate> for Lesson {
    #[tracing::instrument(skip(client))]
    async fn create(client: &ApiClient, data: LessonCreate) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        client
            .send_json(resource, Method::POST, &[resource.path()], &data)
            .await
    }

    #[tracing::instrument(skip(client))]
    async fn update(
        client: &ApiClient,
        id: &str,
        data: LessonUpdate,
    ) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), id];
        client.send_json(resource, Method::PUT, &path, &data).await
    }
}

impl Lesson {
    /// All lessons of a course, sorted by `order`. Equal orders keep the
    /// backend's relative order.
    pub async fn all_by_course(client: &ApiClient, course_id: &str) -> ApiResult<Vec<Self>> {
        let page = Self::page(client, &LessonListParams::ordered_for(course_id)).await?;
        Ok(sort_by_order(page.data))
    }
}

pub fn sort_by_order(mut lessons: Vec<Lesson>) -> Vec<Lesson> {
    lessons.sort_by_key(Lesson::order);
    lessons
}

impl_paginatable_for!(Lesson, LessonListParams);
