//! Persistence and validation core for student records.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use config::{ConfigLoadError, ConnectionTarget, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{Student, StudentId, StudentValidationError, UNSAVED_ID};
pub use repo::student_repo::{SqliteStudentStore, StoreError, StoreResult, StudentRepository};
pub use service::student_service::{ServiceError, ServiceResult, StudentService};
pub use validate::{is_valid_age, is_valid_course, is_valid_email, is_valid_name};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
