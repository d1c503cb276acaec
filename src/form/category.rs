use async_trait::async_trait;

use crate::{
    api::{ApiClient, ApiResult},
    form::{EntityForm, ValidationErrors},
    model::{
        CrudResource, SuccessResponse,
        entity::{Category, CategoryCreate, CategoryUpdate},
    },
};

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    id: Option<String>,
    pub name: String,
    pub description: String,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(category: &Category) -> Self {
        Self {
            id: Some(category.id().to_string()),
            name: category.name().to_string(),
            description: category.description().unwrap_or_default().to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Omitted on create when blank. An edit always sends it, so an emptied
    /// box clears the stored description.
    fn description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (self.is_edit() || !trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[async_trait]
impl EntityForm for CategoryForm {
    type Output = Category;

    const FAILURE_MESSAGE: &'static str = "Failed to save category";

    fn success_message(&self) -> &'static str {
        if self.is_edit() {
            "Category updated successfully"
        } else {
            "Category created successfully"
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.into_result()
    }

    async fn send(self, client: &ApiClient) -> ApiResult<SuccessResponse<Category>> {
        let description = self.description();
        match &self.id {
            Some(id) => {
                let update = CategoryUpdate {
                    name: Some(self.name.trim().to_string()),
                    description,
                };
                Category::update(client, id, update).await
            }
            None => {
                let create = CategoryCreate {
                    name: self.name.trim().to_string(),
                    description,
                };
                Category::create(client, create).await
            }
        }
    }
}
