use crate::{form::ValidationErrors, model::entity::LoginRequest};

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email, "Email is required");
        errors.require("password", &self.password, "Password is required");
        errors.into_result()
    }

    pub fn into_request(self) -> Result<LoginRequest, ValidationErrors> {
        self.validate()?;
        Ok(LoginRequest::new(self.email.trim(), self.password))
    }
}
