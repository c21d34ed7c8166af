//! Attendance sessions, records and the batch submission payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Category;

/// Kind of attendance-taking event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    #[default]
    Regular,
    Event,
}

/// One member's presence within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: i64,
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A recorded attendance session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: i64,
    pub date: NaiveDate,
    pub department_id: i64,
    pub category: Category,
    #[serde(rename = "type", default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

/// Body of `POST /attendance/sessions/batch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSessionRequest {
    pub date: NaiveDate,
    pub department_id: i64,
    pub category: Category,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub records: Vec<AttendanceRecord>,
}

/// Opaque session reference returned by a batch submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionReceipt(pub serde_json::Value);

impl SessionReceipt {
    /// The session identifier, when the backend includes one.
    pub fn session_id(&self) -> Option<i64> {
        match &self.0 {
            serde_json::Value::Number(n) => n.as_i64(),
            other => other
                .get("id")
                .or_else(|| other.get("session_id"))
                .and_then(serde_json::Value::as_i64),
        }
    }
}
