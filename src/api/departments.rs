//! Department endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{Department, DepartmentRequest, ListEnvelope};

impl ApiClient {
    /// GET /departments/ - List departments.
    pub async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
        let envelope: ListEnvelope<Department> = self.get("/departments/", &[]).await?;
        Ok(envelope.into_vec())
    }

    /// GET /departments/:id - Get a single department.
    pub async fn get_department(&self, id: i64) -> Result<Department, ApiError> {
        self.get(&format!("/departments/{}", id), &[]).await
    }

    /// POST /departments/ - Create a department.
    pub async fn create_department(
        &self,
        request: &DepartmentRequest,
    ) -> Result<Department, ApiError> {
        validate_department(request)?;
        self.post("/departments/", &[], request).await
    }

    /// PUT /departments/:id - Update a department.
    pub async fn update_department(
        &self,
        id: i64,
        request: &DepartmentRequest,
    ) -> Result<Department, ApiError> {
        validate_department(request)?;
        self.put(&format!("/departments/{}", id), request).await
    }

    /// DELETE /departments/:id - Delete a department.
    pub async fn delete_department(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/departments/{}", id)).await
    }
}

fn validate_department(request: &DepartmentRequest) -> Result<(), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Department name is required".to_string(),
        ));
    }
    Ok(())
}
