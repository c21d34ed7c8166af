//! Batch submitter state machine.
//!
//! `Idle -> Validating -> Submitting -> Succeeded`, falling back to `Idle` with
//! an error message on any validation or backend failure. `submit` takes
//! `&mut self`, so a form never has more than one submission in flight.

use chrono::NaiveDate;

use super::{EligibilityResolver, PresenceLedger, SessionParams};
use crate::errors::ApiError;
use crate::models::{
    AttendanceRecord, BatchSessionRequest, Category, SessionReceipt, SessionType, Student,
};
use crate::store::Repository;

pub const MSG_SELECT_DEPARTMENT: &str = "Please select a department";
pub const MSG_SELECT_CATEGORY: &str = "Please select a category";
pub const MSG_NO_ELIGIBLE: &str = "No eligible students for this department and category";
pub const MSG_NONE_PRESENT: &str = "Please mark at least one student as present";

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
}

/// State of one attendance-taking form.
#[derive(Debug, Clone)]
pub struct AttendanceForm {
    params: SessionParams,
    eligible: Vec<Student>,
    ledger: PresenceLedger,
    notes: String,
    phase: SubmitPhase,
    error: Option<String>,
}

impl AttendanceForm {
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            eligible: Vec::new(),
            ledger: PresenceLedger::new(),
            notes: String::new(),
            phase: SubmitPhase::Idle,
            error: None,
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// The currently loaded eligible list.
    pub fn eligible(&self) -> &[Student] {
        &self.eligible
    }

    pub fn ledger(&self) -> &PresenceLedger {
        &self.ledger
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// The message to show next to the submit control, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the submit control should be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, SubmitPhase::Validating | SubmitPhase::Submitting)
    }

    /// Members of the loaded eligible list marked present.
    pub fn selected_count(&self) -> usize {
        self.eligible
            .iter()
            .filter(|member| self.ledger.is_present(member.id))
            .count()
    }

    // ==================== PARAMETERS ====================

    /// Changing the department unloads the eligible list. Presence marks are
    /// kept; marks for members that are no longer eligible are ignored at submit.
    pub fn select_department(&mut self, department_id: Option<i64>) {
        if self.params.department_id != department_id {
            self.params.department_id = department_id;
            self.eligible.clear();
        }
        self.reopen();
    }

    pub fn select_category(&mut self, category: Option<Category>) {
        if self.params.category != category {
            self.params.category = category;
            self.eligible.clear();
        }
        self.reopen();
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.params.date = date;
        self.reopen();
    }

    pub fn set_session_type(&mut self, session_type: SessionType) {
        self.params.session_type = session_type;
        self.reopen();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
        self.reopen();
    }

    // ==================== ELIGIBILITY ====================

    /// Fetch the eligible list for the current parameters.
    pub async fn load_eligible(&mut self, resolver: &EligibilityResolver) -> Result<usize, ApiError> {
        match resolver.resolve(&self.params).await {
            Ok(students) => {
                self.eligible = students;
                Ok(self.eligible.len())
            }
            Err(e) => {
                self.eligible.clear();
                self.error = Some(e.message());
                Err(e)
            }
        }
    }

    /// Replace the eligible list with externally loaded members.
    pub fn set_eligible(&mut self, students: Vec<Student>) {
        self.eligible = students;
    }

    // ==================== PRESENCE ====================

    pub fn toggle_present(&mut self, member_id: i64, present: bool) {
        self.ledger.toggle_present(member_id, present);
        self.reopen();
    }

    /// Mark every currently eligible member present or absent.
    pub fn set_all_present(&mut self, present: bool) {
        self.ledger
            .set_all_present(self.eligible.iter().map(|s| s.id), present);
        self.reopen();
    }

    // ==================== SUBMISSION ====================

    /// Validate the form and build the batch from the live eligible list.
    pub fn build_batch(&self) -> Result<BatchSessionRequest, ApiError> {
        let department_id = self
            .params
            .department_id
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::Validation(MSG_SELECT_DEPARTMENT.to_string()))?;
        let category = self
            .params
            .category
            .ok_or_else(|| ApiError::Validation(MSG_SELECT_CATEGORY.to_string()))?;

        if self.eligible.is_empty() {
            return Err(ApiError::Validation(MSG_NO_ELIGIBLE.to_string()));
        }
        if !self.eligible.iter().any(|s| self.ledger.is_present(s.id)) {
            return Err(ApiError::Validation(MSG_NONE_PRESENT.to_string()));
        }

        let notes = Some(self.notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let records = self
            .eligible
            .iter()
            .map(|student| AttendanceRecord {
                student_id: student.id,
                present: self.ledger.is_present(student.id),
                notes: notes.clone(),
            })
            .collect();

        Ok(BatchSessionRequest {
            date: self.params.date,
            department_id,
            category,
            session_type: self.params.session_type,
            records,
        })
    }

    /// Validate and submit the session as one call.
    ///
    /// On success the ledger and notes are cleared and `on_success` runs with the
    /// backend's session reference. On failure the ledger is left untouched.
    pub async fn submit<F>(
        &mut self,
        repo: &Repository,
        on_success: F,
    ) -> Result<SessionReceipt, ApiError>
    where
        F: FnOnce(&SessionReceipt),
    {
        self.error = None;
        self.phase = SubmitPhase::Validating;

        let batch = match self.build_batch() {
            Ok(batch) => batch,
            Err(e) => return Err(self.fail(e)),
        };

        self.phase = SubmitPhase::Submitting;
        tracing::debug!(
            "Submitting {} records for department {} ({})",
            batch.records.len(),
            batch.department_id,
            batch.category
        );

        match repo.submit_session(&batch).await {
            Ok(receipt) => {
                tracing::info!(
                    "Recorded session on {} for department {} with {} present",
                    batch.date,
                    batch.department_id,
                    batch.records.iter().filter(|r| r.present).count()
                );
                self.ledger.clear();
                self.notes.clear();
                self.phase = SubmitPhase::Succeeded;
                on_success(&receipt);
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!("Session submission failed: {}", e);
                Err(self.fail(e))
            }
        }
    }

    fn fail(&mut self, error: ApiError) -> ApiError {
        self.phase = SubmitPhase::Idle;
        self.error = Some(error.message());
        error
    }

    /// Any edit after a successful submission starts a new composition.
    fn reopen(&mut self) {
        if self.phase == SubmitPhase::Succeeded {
            self.phase = SubmitPhase::Idle;
        }
    }
}
