//! Attendance endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{
    AttendanceSession, BatchSessionRequest, Category, ListEnvelope, SessionReceipt, Student,
};

impl ApiClient {
    /// GET /attendance/eligible-students/ - Members of a department/category pairing.
    pub async fn eligible_students(
        &self,
        department_id: i64,
        category: Category,
    ) -> Result<Vec<Student>, ApiError> {
        let query = [
            ("department_id", department_id.to_string()),
            ("category", category.to_string()),
        ];
        let envelope: ListEnvelope<Student> =
            self.get("/attendance/eligible-students/", &query).await?;
        Ok(envelope.into_vec())
    }

    /// POST /attendance/sessions/batch - Create a session and all its records in one call.
    pub async fn submit_batch(
        &self,
        request: &BatchSessionRequest,
    ) -> Result<SessionReceipt, ApiError> {
        self.post(
            "/attendance/sessions/batch",
            &[("department_id", request.department_id.to_string())],
            request,
        )
        .await
    }

    /// GET /attendance/sessions/ - Recorded sessions.
    pub async fn list_sessions(&self) -> Result<Vec<AttendanceSession>, ApiError> {
        let envelope: ListEnvelope<AttendanceSession> =
            self.get("/attendance/sessions/", &[]).await?;
        Ok(envelope.into_vec())
    }
}
