//! Review domain model.
//!
//! # Responsibility
//! - Hold one review's year, summary and employee reference.
//! - Validate every field on construction and on assignment.
//!
//! # Invariants
//! - `year >= MIN_REVIEW_YEAR`.
//! - `summary.trim()` is never empty. The untrimmed text is kept as given.
//! - `employee.id` is always `Some`.
//! - `id` is only assigned or cleared by the repository.

use crate::model::employee::{Employee, EmployeeId};
use crate::model::error::ValidationError;
use crate::repo::employee_repo::{resolve_employee, EmployeeLookup};
use crate::repo::RepoResult;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Row id of the `reviews` table.
pub type ReviewId = i64;

/// Earliest year a review may cover.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// One performance review for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee: Employee,
}

impl Review {
    /// Creates an unsaved review for an already persisted employee.
    ///
    /// Construction never writes to storage; see `ReviewRepository::save`.
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee: Employee,
    ) -> Result<Self, ValidationError> {
        let summary = summary.into();
        validate_year(year)?;
        validate_summary(&summary)?;
        validate_employee(&employee)?;

        Ok(Self {
            id: None,
            year,
            summary,
            employee,
        })
    }

    /// Creates a review that already has a row id.
    pub fn with_id(
        id: ReviewId,
        year: i64,
        summary: impl Into<String>,
        employee: Employee,
    ) -> Result<Self, ValidationError> {
        validate_id(id)?;
        let mut review = Self::new(year, summary, employee)?;
        review.id = Some(id);
        Ok(review)
    }

    /// Creates an unsaved review, resolving the employee through `lookup`.
    ///
    /// # Errors
    /// - `ValidationError::EmployeeNotFound` when no persisted employee has
    ///   `employee_id`.
    /// - Storage errors from the lookup are returned unchanged.
    pub fn with_employee_id<L>(
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
        lookup: &L,
    ) -> RepoResult<Self>
    where
        L: EmployeeLookup + ?Sized,
    {
        let employee = resolve_employee(lookup, employee_id)?;
        Ok(Self::new(year, summary, employee)?)
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    /// Foreign key view of the referenced employee.
    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Assigns a new year. The old value is kept on rejection.
    pub fn set_year(&mut self, year: i64) -> Result<(), ValidationError> {
        validate_year(year)?;
        self.year = year;
        Ok(())
    }

    /// Assigns a new summary. The old value is kept on rejection.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ValidationError> {
        let summary = summary.into();
        validate_summary(&summary)?;
        self.summary = summary;
        Ok(())
    }

    /// Points this review at another persisted employee.
    pub fn set_employee(&mut self, employee: Employee) -> Result<(), ValidationError> {
        validate_employee(&employee)?;
        self.employee = employee;
        Ok(())
    }

    /// Points this review at the employee stored under `employee_id`.
    pub fn set_employee_id<L>(&mut self, employee_id: EmployeeId, lookup: &L) -> RepoResult<()>
    where
        L: EmployeeLookup + ?Sized,
    {
        let employee = resolve_employee(lookup, employee_id)?;
        self.set_employee(employee)?;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: ReviewId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }

    /// Overwrites all persisted fields at once. Callers validate first.
    pub(crate) fn refresh(&mut self, year: i64, summary: String, employee: Employee) {
        self.year = year;
        self.summary = summary;
        self.employee = employee;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Construction and setters keep the employee persisted.
        let employee_id = self.employee.id.unwrap_or_default();
        match self.id {
            Some(id) => write!(
                f,
                "<Review {id}: {}, {}, Employee {employee_id}>",
                self.year, self.summary
            ),
            None => write!(
                f,
                "<Review None: {}, {}, Employee {employee_id}>",
                self.year, self.summary
            ),
        }
    }
}

pub(crate) fn validate_id(id: ReviewId) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::InvalidId(id));
    }
    Ok(())
}

pub(crate) fn validate_year(year: i64) -> Result<(), ValidationError> {
    if year < MIN_REVIEW_YEAR {
        return Err(ValidationError::YearTooEarly(year));
    }
    Ok(())
}

pub(crate) fn validate_summary(summary: &str) -> Result<(), ValidationError> {
    if summary.trim().is_empty() {
        return Err(ValidationError::BlankSummary);
    }
    Ok(())
}

pub(crate) fn validate_employee(employee: &Employee) -> Result<(), ValidationError> {
    if employee.id.is_none() {
        return Err(ValidationError::UnpersistedEmployee);
    }
    Ok(())
}
