//! Student (member) model and the age-bracket category enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CategoryDetails;
use crate::errors::ApiError;

/// One of the four fixed age brackets used to segment members and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Child,
    Adolescent,
    Youth,
    Adult,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Child,
        Category::Adolescent,
        Category::Youth,
        Category::Adult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Child => "child",
            Category::Adolescent => "adolescent",
            Category::Youth => "youth",
            Category::Adult => "adult",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ApiError::Validation(format!("Unknown category: {}", s.trim())))
    }
}

/// A tracked individual belonging to a department and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default, alias = "church_affiliation")]
    pub church: Option<String>,
    pub department_id: i64,
    pub category: Category,
    /// Category-specific detail blob, kept opaque on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Student {
    /// Decode the detail blob into its typed variant, if present and well formed.
    pub fn typed_details(&self) -> Option<CategoryDetails> {
        self.details
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

/// Request body for creating a new student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub age: u32,
    pub sex: String,
    pub church: String,
    pub department_id: i64,
    pub category: Category,
    pub details: CategoryDetails,
}

/// Request body for updating an existing student.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateStudentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub church: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CategoryDetails>,
}

/// Optional filters for the student listing endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StudentFilter {
    pub department_id: Option<i64>,
    pub category: Option<Category>,
}
