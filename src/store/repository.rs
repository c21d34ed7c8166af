//! Repository for all data operations.
//!
//! Reads go through [`QueryCache::fetch`]; writes call the backend and then
//! invalidate the entity tags they touch.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cache::{EntityTag, QueryCache, QueryKey};
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{
    AttendanceSession, BatchSessionRequest, Category, CreateStudentRequest, CreateUserRequest,
    Department, DepartmentRequest, SessionReceipt, Student, StudentFilter, UpdateStudentRequest,
    User,
};

/// Backend access with a shared query cache.
#[derive(Clone)]
pub struct Repository {
    client: ApiClient,
    cache: Arc<QueryCache>,
}

impl Repository {
    pub fn new(client: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { client, cache }
    }

    /// Build a client and cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(client, Arc::new(QueryCache::new(config.cache_ttl))))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    // ==================== SESSION ====================

    /// Log in and return the authenticated user.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.cache.clear();
        self.client.login(email, password).await?;
        self.current_user().await
    }

    /// Forget credentials and every cached query. Reads still in flight finish
    /// for their callers but are not cached.
    pub fn logout(&self) {
        self.client.logout();
        self.cache.clear();
    }

    // ==================== USER OPERATIONS ====================

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.cache
            .fetch(QueryKey::CurrentUser, || self.client.current_user())
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.cache
            .fetch(QueryKey::Users, || self.client.list_users())
            .await
    }

    pub async fn create_manager(
        &self,
        department_id: i64,
        request: &CreateUserRequest,
    ) -> Result<User, ApiError> {
        let user = self.client.create_manager(department_id, request).await?;
        self.invalidate(&[EntityTag::Users, EntityTag::Departments]);
        Ok(user)
    }

    pub async fn create_admin(
        &self,
        department_id: i64,
        request: &CreateUserRequest,
    ) -> Result<User, ApiError> {
        let user = self.client.create_admin(department_id, request).await?;
        self.invalidate(&[EntityTag::Users, EntityTag::Departments]);
        Ok(user)
    }

    // ==================== DEPARTMENT OPERATIONS ====================

    pub async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
        self.cache
            .fetch(QueryKey::Departments, || self.client.list_departments())
            .await
    }

    pub async fn get_department(&self, id: i64) -> Result<Department, ApiError> {
        self.cache
            .fetch(QueryKey::Department(id), || self.client.get_department(id))
            .await
    }

    pub async fn create_department(
        &self,
        request: &DepartmentRequest,
    ) -> Result<Department, ApiError> {
        let department = self.client.create_department(request).await?;
        self.invalidate(&[EntityTag::Departments]);
        Ok(department)
    }

    pub async fn update_department(
        &self,
        id: i64,
        request: &DepartmentRequest,
    ) -> Result<Department, ApiError> {
        let department = self.client.update_department(id, request).await?;
        self.invalidate(&[EntityTag::Departments]);
        Ok(department)
    }

    /// Deleting a department also drops its students from every cached listing.
    pub async fn delete_department(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete_department(id).await?;
        self.invalidate(&[EntityTag::Departments, EntityTag::Students]);
        Ok(())
    }

    // ==================== STUDENT OPERATIONS ====================

    pub async fn list_students(&self, filter: StudentFilter) -> Result<Vec<Student>, ApiError> {
        self.cache
            .fetch(QueryKey::Students(filter), || {
                self.client.list_students(&filter)
            })
            .await
    }

    pub async fn get_student(&self, id: i64) -> Result<Student, ApiError> {
        self.cache
            .fetch(QueryKey::Student(id), || self.client.get_student(id))
            .await
    }

    /// Student mutations also change the owning department's membership list.
    pub async fn create_student(&self, request: &CreateStudentRequest) -> Result<Student, ApiError> {
        let student = self.client.create_student(request).await?;
        self.invalidate(&[EntityTag::Students, EntityTag::Departments]);
        Ok(student)
    }

    pub async fn update_student(
        &self,
        id: i64,
        request: &UpdateStudentRequest,
    ) -> Result<Student, ApiError> {
        let student = self.client.update_student(id, request).await?;
        self.invalidate(&[EntityTag::Students, EntityTag::Departments]);
        Ok(student)
    }

    pub async fn delete_student(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete_student(id).await?;
        self.invalidate(&[EntityTag::Students, EntityTag::Departments]);
        Ok(())
    }

    // ==================== ATTENDANCE OPERATIONS ====================

    /// Candidate members for a department/category session, cached per pairing.
    pub async fn eligible_students(
        &self,
        department_id: i64,
        category: Category,
    ) -> Result<Vec<Student>, ApiError> {
        let key = QueryKey::EligibleStudents {
            department_id,
            category,
        };
        self.cache
            .fetch(key, || self.client.eligible_students(department_id, category))
            .await
    }

    /// Submit a batch; on success every cached session listing is dropped.
    pub async fn submit_session(
        &self,
        request: &BatchSessionRequest,
    ) -> Result<SessionReceipt, ApiError> {
        let receipt = self.client.submit_batch(request).await?;
        self.invalidate(&[EntityTag::Sessions]);
        Ok(receipt)
    }

    pub async fn list_sessions(&self) -> Result<Vec<AttendanceSession>, ApiError> {
        self.cache
            .fetch(QueryKey::Sessions, || self.client.list_sessions())
            .await
    }

    fn invalidate(&self, tags: &[EntityTag]) {
        for tag in tags {
            self.cache.invalidate(*tag);
        }
    }
}
