//! Employee reference model.
//!
//! Reviews only read employees. Creating and listing them lives in
//! `repo::employee_repo`.

use crate::model::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Row id of the `employees` table.
pub type EmployeeId = i64;

/// Employee record as stored in `employees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// `None` until the row is inserted.
    pub id: Option<EmployeeId>,
    pub name: String,
    pub job_title: String,
}

impl Employee {
    /// Creates an unsaved employee.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let employee = Self {
            id: None,
            name: name.into(),
            job_title: job_title.into(),
        };
        employee.validate()?;
        Ok(employee)
    }

    /// Creates an employee that already exists in storage.
    pub fn with_id(
        id: EmployeeId,
        name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::InvalidId(id));
        }
        let mut employee = Self::new(name, job_title)?;
        employee.id = Some(id);
        Ok(employee)
    }

    /// Checks the name and job title fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankEmployeeName);
        }
        if self.job_title.trim().is_empty() {
            return Err(ValidationError::BlankJobTitle);
        }
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
