//! Review persistence core.
//! Validates reviews, maps them onto the `reviews` table and keeps one live
//! instance per stored row.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::employee::{Employee, EmployeeId};
pub use model::error::ValidationError;
pub use model::review::{Review, ReviewId, MIN_REVIEW_YEAR};
pub use repo::employee_repo::{EmployeeLookup, SqliteEmployeeRepository};
pub use repo::identity::IdentityMap;
pub use repo::review_repo::{ReviewHandle, ReviewRepository, ReviewRow, SqliteReviewRepository};
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
