//! Department model.

use serde::{Deserialize, Serialize};

/// An organizational unit scoping membership and admin/manager access.
///
/// Listing payloads usually omit the membership lists, so they default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub student_ids: Vec<i64>,
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    #[serde(default)]
    pub manager_ids: Vec<i64>,
}

impl Department {
    /// Whether `user_id` administers or manages this department.
    pub fn is_staffed_by(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id) || self.manager_ids.contains(&user_id)
    }
}

/// Request body for creating or replacing a department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
