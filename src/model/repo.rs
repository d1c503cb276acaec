use reqwest::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    api::{ApiClient, ApiResult},
    query::QueryParams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Category,
    Course,
    Lesson,
    Progress,
    Transaction,
}

impl ResourceType {
    /// Collection path under `/api/v1`.
    pub fn path(&self) -> &'static str {
        match self {
            Self::User => "auth",
            Self::Category => "categories",
            Self::Course => "courses",
            Self::Lesson => "lessons",
            Self::Progress => "progress",
            Self::Transaction => "transactions",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Category => "Category",
            Self::Course => "Course",
            Self::Lesson => "Lesson",
            Self::Progress => "Progress",
            Self::Transaction => "Transaction",
        }
    }
}

/// Pagination metadata returned alongside every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub last_page: u32,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        Self { data, meta }
    }

    pub fn has_more(&self) -> bool {
        self.meta.page < self.meta.last_page
    }
}

/// `{ "data": T }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `{ "message": "...", "data": T }`, returned by mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub message: String,
    pub data: T,
}

/// `{ "message": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

#[async_trait::async_trait]
pub trait CrudResource<Create, Update>: ResourceTyped + DeserializeOwned + Send + Sync
where
    Create: Send + 'static,
    Update: Send + 'static,
{
    async fn create(client: &ApiClient, data: Create) -> ApiResult<SuccessResponse<Self>>;

    async fn update(
        client: &ApiClient,
        id: &str,
        data: Update,
    ) -> ApiResult<SuccessResponse<Self>>;

    async fn find_by_id(client: &ApiClient, id: &str) -> ApiResult<Self> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), id];
        let found: DataResponse<Self> = client.get(resource, &path, &[]).await?;
        Ok(found.data)
    }

    async fn delete(client: &ApiClient, id: &str) -> ApiResult<MessageResponse> {
        delete_resource(client, Self::get_resource_type(), id).await
    }
}

pub async fn delete_resource(
    client: &ApiClient,
    resource: ResourceType,
    id: &str,
) -> ApiResult<MessageResponse> {
    let path = [resource.path(), id];
    client.send_empty(resource, Method::DELETE, &path).await
}

#[async_trait::async_trait]
pub trait PaginatableResource: ResourceTyped + Sized {
    type Params: QueryParams + Send + Sync;

    async fn page(client: &ApiClient, params: &Self::Params) -> ApiResult<Page<Self>>;
}

/// Collections that also have a `/my` listing for the signed-in viewer.
#[async_trait::async_trait]
pub trait ViewerScopedResource: PaginatableResource {
    async fn page_for_viewer(client: &ApiClient, params: &Self::Params) -> ApiResult<Page<Self>>;
}

#[macro_export]
macro_rules! impl_paginatable_for {
    ($ent:ident, $params:ty) => {
        #[async_trait::async_trait]
        impl $crate::model::PaginatableResource for $ent {
            type Params = $params;

            async fn page(
                client: &$crate::api::ApiClient,
                params: &$params,
            ) -> $crate::api::ApiResult<$crate::model::Page<$ent>> {
                let resource = <$ent as $crate::model::ResourceTyped>::get_resource_type();
                let query = $crate::query::QueryParams::to_request_pairs(params);
                client.get(resource, &[resource.path()], &query).await
            }
        }
    };
}
