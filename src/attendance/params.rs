//! Session parameter selection.

use chrono::NaiveDate;

use crate::cache::QueryKey;
use crate::models::{Category, SessionType};

/// Parameters identifying the session being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    pub department_id: Option<i64>,
    pub category: Option<Category>,
    pub date: NaiveDate,
    pub session_type: SessionType,
}

impl SessionParams {
    /// Empty selection for a given date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            department_id: None,
            category: None,
            date,
            session_type: SessionType::Regular,
        }
    }

    /// Selection for today's local date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// The eligibility query for this selection, or `None` until both a positive
    /// department id and a category are chosen.
    pub fn eligibility_key(&self) -> Option<QueryKey> {
        match (self.department_id, self.category) {
            (Some(department_id), Some(category)) if department_id > 0 => {
                Some(QueryKey::EligibleStudents {
                    department_id,
                    category,
                })
            }
            _ => None,
        }
    }
}
