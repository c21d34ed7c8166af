//! Student endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{
    CreateStudentRequest, ListEnvelope, Student, StudentFilter, UpdateStudentRequest,
};

impl ApiClient {
    /// GET /students/ - List students, optionally narrowed by department and category.
    pub async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, ApiError> {
        let mut query = Vec::new();
        if let Some(department_id) = filter.department_id {
            query.push(("department_id", department_id.to_string()));
        }
        if let Some(category) = filter.category {
            query.push(("category", category.to_string()));
        }

        let envelope: ListEnvelope<Student> = self.get("/students/", &query).await?;
        Ok(envelope.into_vec())
    }

    /// GET /students/:id - Get a single student.
    pub async fn get_student(&self, id: i64) -> Result<Student, ApiError> {
        self.get(&format!("/students/{}", id), &[]).await
    }

    /// POST /students/ - Create a student.
    pub async fn create_student(&self, request: &CreateStudentRequest) -> Result<Student, ApiError> {
        if request.name.trim().is_empty() {
            return Err(ApiError::Validation("Name is required".to_string()));
        }
        if request.details.category() != request.category {
            return Err(ApiError::Validation(format!(
                "Details are for {} but the student is {}",
                request.details.category(),
                request.category
            )));
        }
        self.post("/students/", &[], request).await
    }

    /// PUT /students/:id - Update a student.
    pub async fn update_student(
        &self,
        id: i64,
        request: &UpdateStudentRequest,
    ) -> Result<Student, ApiError> {
        self.put(&format!("/students/{}", id), request).await
    }

    /// DELETE /students/:id - Delete a student.
    pub async fn delete_student(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/students/{}", id)).await
    }
}
