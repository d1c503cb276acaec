pub mod entity;

mod repo;
pub use repo::{
    CrudResource, DataResponse, MessageResponse, Page, PageMeta, PaginatableResource,
    ResourceType, ResourceTyped, SuccessResponse, ViewerScopedResource, delete_resource,
};
