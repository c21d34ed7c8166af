//! Per-category detail shapes collected by the student form.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Category;
use crate::errors::ApiError;

/// Category-specific details; each variant carries its own required fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CategoryDetails {
    Child {
        guardian_name: String,
        guardian_phone: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allergies: Option<String>,
    },
    Adolescent {
        school: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grade: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        guardian_phone: Option<String>,
    },
    Youth {
        occupation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        baptized: Option<bool>,
    },
    Adult {
        phone: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        occupation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marital_status: Option<String>,
    },
}

impl CategoryDetails {
    /// Build the variant for `category` from raw form fields.
    pub fn from_fields(
        category: Category,
        fields: &HashMap<String, String>,
    ) -> Result<Self, ApiError> {
        let details = match category {
            Category::Child => CategoryDetails::Child {
                guardian_name: required(fields, "guardian_name", "Guardian name")?,
                guardian_phone: required(fields, "guardian_phone", "Guardian phone")?,
                allergies: optional(fields, "allergies"),
            },
            Category::Adolescent => CategoryDetails::Adolescent {
                school: required(fields, "school", "School")?,
                grade: optional(fields, "grade"),
                guardian_phone: optional(fields, "guardian_phone"),
            },
            Category::Youth => CategoryDetails::Youth {
                occupation: required(fields, "occupation", "Occupation")?,
                phone: optional(fields, "phone"),
                baptized: optional(fields, "baptized")
                    .map(|raw| parse_flag(&raw))
                    .transpose()?,
            },
            Category::Adult => CategoryDetails::Adult {
                phone: required(fields, "phone", "Phone")?,
                occupation: optional(fields, "occupation"),
                marital_status: optional(fields, "marital_status"),
            },
        };
        Ok(details)
    }

    pub fn category(&self) -> Category {
        match self {
            CategoryDetails::Child { .. } => Category::Child,
            CategoryDetails::Adolescent { .. } => Category::Adolescent,
            CategoryDetails::Youth { .. } => Category::Youth,
            CategoryDetails::Adult { .. } => Category::Adult,
        }
    }
}

fn optional(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(fields: &HashMap<String, String>, key: &str, label: &str) -> Result<String, ApiError> {
    optional(fields, key).ok_or_else(|| ApiError::Validation(format!("{} is required", label)))
}

fn parse_flag(raw: &str) -> Result<bool, ApiError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(ApiError::Validation(format!(
            "Baptized must be yes or no, got {}",
            raw
        ))),
    }
}
