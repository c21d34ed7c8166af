//! Authentication endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{LoginRequest, TokenPair, User};

impl ApiClient {
    /// POST /auth/login - Exchange credentials for a token pair and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let tokens: TokenPair = self.post_anonymous("/auth/login", &request).await?;
        self.credentials().store(tokens.clone());
        tracing::info!("Logged in as {}", request.email);
        Ok(tokens)
    }

    /// Drop stored credentials.
    pub fn logout(&self) {
        self.credentials().clear();
        tracing::info!("Logged out");
    }

    /// GET /users/me - The authenticated user.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/users/me", &[]).await
    }
}
