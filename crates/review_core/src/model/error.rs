//! Validation failures raised by model setters and reference resolution.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Single error kind for every rejected field value or employee reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Review year is below the supported floor.
    YearTooEarly(i64),
    /// Stored year column does not hold an integer.
    YearNotInteger,
    /// Summary is empty after trimming whitespace.
    BlankSummary,
    /// Stored summary column does not hold text.
    SummaryNotText,
    /// Employee reference carries no persisted id.
    UnpersistedEmployee,
    /// Stored row has no employee reference at all.
    MissingEmployee,
    /// Employee id does not resolve to a persisted employee.
    EmployeeNotFound(i64),
    /// Surrogate key must be positive.
    InvalidId(i64),
    BlankEmployeeName,
    BlankJobTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearTooEarly(year) => {
                write!(f, "year must be an integer >= 2000, got {year}")
            }
            Self::YearNotInteger => write!(f, "year must be an integer >= 2000"),
            Self::BlankSummary => write!(f, "summary must be a non-empty string"),
            Self::SummaryNotText => write!(f, "summary must be a non-empty string"),
            Self::UnpersistedEmployee => {
                write!(f, "employee must be persisted before assigning to review")
            }
            Self::MissingEmployee => write!(f, "review must reference an employee"),
            Self::EmployeeNotFound(id) => {
                write!(f, "employee_id {id} must refer to a persisted Employee")
            }
            Self::InvalidId(id) => write!(f, "id must be a positive integer, got {id}"),
            Self::BlankEmployeeName => write!(f, "employee name must be a non-empty string"),
            Self::BlankJobTitle => write!(f, "employee job_title must be a non-empty string"),
        }
    }
}

impl Error for ValidationError {}
