use serde::{Deserialize, Serialize};

use crate::model::{ResourceType, ResourceTyped};
use crate::session::UserRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    avatar_url: String,
    name: String,
    email: String,
    role: UserRole,
    #[serde(default)]
    phone: Option<String>,
}

impl ResourceTyped for User {
    fn get_resource_type() -> ResourceType {
        ResourceType::User
    }
}

impl User {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub fcm_token: String,
}

impl LoginRequest {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            fcm_token: String::new(),
        }
    }
}
