//! Multi-step student creation wizard.
//!
//! The wizard is a small state machine over numbered sections. Each `next()`
//! validates only the section being left, so every step is testable without a
//! rendering layer.

use std::collections::HashMap;

use crate::errors::ApiError;
use crate::models::{Category, CategoryDetails, CreateStudentRequest};

/// Wizard sections in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardSection {
    Basics,
    Affiliation,
    Details,
    Review,
}

impl WizardSection {
    pub const COUNT: u8 = 4;

    /// 1-based position of the section.
    pub fn number(&self) -> u8 {
        match self {
            WizardSection::Basics => 1,
            WizardSection::Affiliation => 2,
            WizardSection::Details => 3,
            WizardSection::Review => 4,
        }
    }

    fn following(&self) -> Option<Self> {
        match self {
            WizardSection::Basics => Some(WizardSection::Affiliation),
            WizardSection::Affiliation => Some(WizardSection::Details),
            WizardSection::Details => Some(WizardSection::Review),
            WizardSection::Review => None,
        }
    }

    fn preceding(&self) -> Option<Self> {
        match self {
            WizardSection::Basics => None,
            WizardSection::Affiliation => Some(WizardSection::Basics),
            WizardSection::Details => Some(WizardSection::Affiliation),
            WizardSection::Review => Some(WizardSection::Details),
        }
    }
}

/// Raw form fields plus the current section.
#[derive(Debug, Clone)]
pub struct StudentWizard {
    section: WizardSection,
    fields: HashMap<String, String>,
}

impl Default for StudentWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentWizard {
    pub fn new() -> Self {
        Self {
            section: WizardSection::Basics,
            fields: HashMap::new(),
        }
    }

    /// Start at section 1 with the department already chosen.
    pub fn for_department(department_id: i64) -> Self {
        let mut wizard = Self::new();
        wizard.set_field("department_id", department_id.to_string());
        wizard
    }

    pub fn section(&self) -> WizardSection {
        self.section
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Validate the current section and advance. Stays put on error.
    pub fn next(&mut self) -> Result<WizardSection, ApiError> {
        self.validate(self.section)?;
        if let Some(next) = self.section.following() {
            self.section = next;
        }
        Ok(self.section)
    }

    /// Step back; never moves before the first section.
    pub fn previous(&mut self) -> WizardSection {
        if let Some(previous) = self.section.preceding() {
            self.section = previous;
        }
        self.section
    }

    /// Build the create request. Only allowed from the review section.
    pub fn finish(&self) -> Result<CreateStudentRequest, ApiError> {
        if self.section != WizardSection::Review {
            return Err(ApiError::Validation(format!(
                "Complete section {} of {} first",
                self.section.number(),
                WizardSection::COUNT
            )));
        }

        let category = self.category()?;
        Ok(CreateStudentRequest {
            name: self.text("name", "Name")?,
            age: self.age()?,
            sex: self.sex()?,
            church: self.text("church", "Church")?,
            department_id: self.department_id()?,
            category,
            details: CategoryDetails::from_fields(category, &self.fields)?,
        })
    }

    fn validate(&self, section: WizardSection) -> Result<(), ApiError> {
        match section {
            WizardSection::Basics => {
                self.text("name", "Name")?;
                self.age()?;
                self.sex()?;
            }
            WizardSection::Affiliation => {
                self.text("church", "Church")?;
                self.department_id()?;
                self.category()?;
            }
            WizardSection::Details => {
                CategoryDetails::from_fields(self.category()?, &self.fields)?;
            }
            WizardSection::Review => {}
        }
        Ok(())
    }

    fn text(&self, name: &str, label: &str) -> Result<String, ApiError> {
        self.field(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Validation(format!("{} is required", label)))
    }

    fn age(&self) -> Result<u32, ApiError> {
        let raw = self.text("age", "Age")?;
        match raw.parse::<u32>() {
            Ok(age) if (1..=120).contains(&age) => Ok(age),
            _ => Err(ApiError::Validation(
                "Age must be a whole number between 1 and 120".to_string(),
            )),
        }
    }

    fn sex(&self) -> Result<String, ApiError> {
        let raw = self.text("sex", "Sex")?.to_ascii_lowercase();
        match raw.as_str() {
            "male" | "female" => Ok(raw),
            _ => Err(ApiError::Validation("Sex must be male or female".to_string())),
        }
    }

    fn department_id(&self) -> Result<i64, ApiError> {
        let raw = self.text("department_id", "Department")?;
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ApiError::Validation("Please select a department".to_string())),
        }
    }

    fn category(&self) -> Result<Category, ApiError> {
        self.text("category", "Category")?.parse()
    }
}
