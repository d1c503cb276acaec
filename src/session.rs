//! Viewer session: who is signed in and what their role lets them see.
//!

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiResult};
use crate::model::entity::{LoginRequest, User};
use crate::model::{DataResponse, MessageResponse, ResourceType, ResourceTyped, SuccessResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub link: &'static str,
}

static ADMIN_MENU: [MenuItem; 5] = [
    MenuItem { label: "Dashboard", link: "/admin/dashboard" },
    MenuItem { label: "Manage Courses", link: "/admin/courses" },
    MenuItem { label: "Manage Categories", link: "/admin/categories" },
    MenuItem { label: "Manage Transactions", link: "/admin/transactions" },
    MenuItem { label: "Settings", link: "/settings" },
];

static USER_MENU: [MenuItem; 4] = [
    MenuItem { label: "Dashboard", link: "/dashboard" },
    MenuItem { label: "My Courses", link: "/my-courses" },
    MenuItem { label: "Transaction History", link: "/transactions" },
    MenuItem { label: "Settings", link: "/settings" },
];

/// Everything that differs between the admin and the user experience.
impl UserRole {
    pub fn menu(&self) -> &'static [MenuItem] {
        match self {
            Self::Admin => &ADMIN_MENU,
            Self::User => &USER_MENU,
        }
    }

    pub fn landing(&self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::User => "/dashboard",
        }
    }

    /// Admins manage enrollments, they never buy courses.
    pub fn can_enroll(&self) -> bool {
        matches!(self, Self::User)
    }

    pub fn can_review_transactions(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Login / register pages; signed-in viewers are sent home.
    GuestOnly,
    Role(UserRole),
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

pub static LOGIN_ROUTE: &str = "/login";
pub static HOME_ROUTE: &str = "/";

/// Session state with an explicit lifecycle: filled by `login` or `restore`,
/// cleared by `logout`, read-only everywhere else.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(User::role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn menu(&self) -> &'static [MenuItem] {
        self.role().map(|r| r.menu()).unwrap_or(&[])
    }

    pub fn guard(&self, access: Access) -> RouteDecision {
        match (access, self.role()) {
            (Access::Public, _) => RouteDecision::Allow,
            (Access::GuestOnly, None) => RouteDecision::Allow,
            (Access::GuestOnly, Some(_)) => RouteDecision::Redirect(HOME_ROUTE),
            (Access::Authenticated | Access::Role(_), None) => RouteDecision::Redirect(LOGIN_ROUTE),
            (Access::Authenticated, Some(_)) => RouteDecision::Allow,
            (Access::Role(required), Some(role)) if required == role => RouteDecision::Allow,
            (Access::Role(_), Some(role)) => RouteDecision::Redirect(role.landing()),
        }
    }

    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&mut self, client: &ApiClient, request: LoginRequest) -> ApiResult<&User> {
        let resource = User::get_resource_type();
        let path = [resource.path(), "login"];
        let response: SuccessResponse<User> = client
            .send_json(resource, Method::POST, &path, &request)
            .await?;

        tracing::info!(user = response.data.id(), role = %response.data.role(), "signed in");
        Ok(self.user.insert(response.data))
    }

    /// Reloads the viewer from the session cookie. An unauthorized answer
    /// leaves the session as a guest.
    pub async fn restore(&mut self, client: &ApiClient) -> ApiResult<Option<&User>> {
        let resource = ResourceType::User;
        let path = [resource.path(), "me"];
        match client.get::<DataResponse<User>>(resource, &path, &[]).await {
            Ok(me) => Ok(Some(self.user.insert(me.data))),
            Err(e) if e.is_unauthorized() => {
                self.user = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Clears the session locally even when the backend call fails.
    pub async fn logout(&mut self, client: &ApiClient) -> ApiResult<MessageResponse> {
        self.user = None;
        let resource = ResourceType::User;
        let path = [resource.path(), "logout"];
        client.send_empty(resource, Method::POST, &path).await
    }

    #[cfg(test)]
    pub(crate) fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }
}
