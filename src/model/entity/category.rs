use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiResult};
use crate::impl_paginatable_for;
use crate::model::{CrudResource, ResourceType, ResourceTyped, SuccessResponse};
use crate::query::CategoryListParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Category {
    fn get_resource_type() -> ResourceType {
        ResourceType::Category
    }
}

impl Category {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[async_trait]
impl CrudResource<CategoryCreate, CategoryUpdate> for Category {
    #[tracing::instrument(skip(client))]
    async fn create(
        client: &ApiClient,
        data: CategoryCreate,
    ) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        client
            .send_json(resource, Method::POST, &[resource.path()], &data)
            .await
    }

    #[tracing::instrument(skip(client))]
    async fn update(
        client: &ApiClient,
        id: &str,
        data: CategoryUpdate,
    ) -> ApiResult<SuccessResponse<Self>> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), id];
        client.send_json(resource, Method::PUT, &path, &data).await
    }
}

impl_paginatable_for!(Category, CategoryListParams);
