//! User account endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{CreateUserRequest, ListEnvelope, User};

impl ApiClient {
    /// GET /users/ - List users visible to the caller.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let envelope: ListEnvelope<User> = self.get("/users/", &[]).await?;
        Ok(envelope.into_vec())
    }

    /// POST /users/admin/create-manager - Create a manager inside a department.
    pub async fn create_manager(
        &self,
        department_id: i64,
        request: &CreateUserRequest,
    ) -> Result<User, ApiError> {
        validate_new_user(request)?;
        self.post(
            "/users/admin/create-manager",
            &[("department_id", department_id.to_string())],
            request,
        )
        .await
    }

    /// POST /users/super-admin/create-admin - Create an admin inside a department.
    pub async fn create_admin(
        &self,
        department_id: i64,
        request: &CreateUserRequest,
    ) -> Result<User, ApiError> {
        validate_new_user(request)?;
        self.post(
            "/users/super-admin/create-admin",
            &[("department_id", department_id.to_string())],
            request,
        )
        .await
    }
}

fn validate_new_user(request: &CreateUserRequest) -> Result<(), ApiError> {
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }
    if request.full_name.trim().is_empty() {
        return Err(ApiError::Validation("Full name is required".to_string()));
    }
    if request.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_validation() {
        let mut request = CreateUserRequest {
            email: "kofi@flock.test".to_string(),
            full_name: "Kofi".to_string(),
            password: "long-enough".to_string(),
        };
        assert!(validate_new_user(&request).is_ok());

        request.password = "short".to_string();
        assert!(validate_new_user(&request).is_err());

        request.password = "long-enough".to_string();
        request.email = "kofi".to_string();
        assert_eq!(
            validate_new_user(&request).unwrap_err().message(),
            "A valid email is required"
        );
    }
}
