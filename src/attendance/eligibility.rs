//! Eligible-member resolution.

use super::SessionParams;
use crate::cache::QueryKey;
use crate::errors::ApiError;
use crate::models::Student;
use crate::store::Repository;

/// Resolves the candidate members for a session selection.
#[derive(Clone)]
pub struct EligibilityResolver {
    repo: Repository,
}

impl EligibilityResolver {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Members of the selected department whose category matches.
    ///
    /// An incomplete selection resolves to an empty list without touching the network.
    pub async fn resolve(&self, params: &SessionParams) -> Result<Vec<Student>, ApiError> {
        match params.eligibility_key() {
            Some(QueryKey::EligibleStudents {
                department_id,
                category,
            }) => self.repo.eligible_students(department_id, category).await,
            _ => Ok(Vec::new()),
        }
    }
}
