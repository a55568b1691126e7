//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Map reviews onto rows of the `reviews` table.
//! - Resolve employee foreign keys through an injected lookup.
//! - Keep one live in-memory instance per persisted review id.
//!
//! # Invariants
//! - Writes only ever receive values that already passed model validation.
//! - Validation failures surface as `RepoError::Validation`; driver failures
//!   surface as `RepoError::Db` and are never retried.

use crate::db::DbError;
use crate::model::error::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod employee_repo;
pub mod identity;
pub mod review_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for review/employee persistence and lookup operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// A caller still holds a borrow of the review handle the repository
    /// needs to read or write. Carries the review id when it can be read.
    InstanceBusy(Option<i64>),
    /// Operation needs a row id but the instance was never saved.
    NotPersisted,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InstanceBusy(Some(id)) => {
                write!(f, "review {id} is borrowed elsewhere; release it and retry")
            }
            Self::InstanceBusy(None) => {
                write!(f, "review is borrowed elsewhere; release it and retry")
            }
            Self::NotPersisted => write!(f, "review has not been saved yet"),
            Self::InvalidData(message) => write!(f, "invalid persisted review data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InstanceBusy(_) | Self::NotPersisted | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
