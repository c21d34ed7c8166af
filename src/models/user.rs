//! User accounts, roles and authentication payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role determining what a user may see and create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Staff,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        };
        f.write_str(name)
    }
}

/// An authenticated dashboard user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Role,
    #[serde(default = "default_active", alias = "active")]
    pub is_active: bool,
    /// Departments defining this user's scope
    #[serde(default, alias = "departments")]
    pub department_ids: Vec<i64>,
}

fn default_active() -> bool {
    true
}

/// Request body for creating a manager or admin account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access/refresh token pair issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            token_type: default_token_type(),
        }
    }
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roles_decode() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "root@flock.test",
            "full_name": "Root",
            "role": "super_admin",
            "departments": [1, 2]
        }))
        .unwrap();

        assert_eq!(user.role, Role::SuperAdmin);
        assert!(user.is_active);
        assert_eq!(user.department_ids, vec![1, 2]);
        assert_eq!(user.role.to_string(), "super_admin");
    }
}
