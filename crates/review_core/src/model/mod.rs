//! Domain model for reviews and the employees they reference.
//!
//! # Responsibility
//! - Define the in-memory shapes persisted by the repository layer.
//! - Enforce field validation at assignment time, never at save time.
//!
//! # Invariants
//! - A `Review` always references an `Employee` with a persisted id.
//! - Rejected assignments leave the previous field value untouched.

pub mod employee;
pub mod error;
pub mod review;
