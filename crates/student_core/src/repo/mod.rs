//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the student data access contract.
//! - Isolate SQLite query details from service/shell orchestration.
//!
//! # Invariants
//! - Repository APIs return absent results for missing rows, and structured
//!   errors (`DuplicateKey`, `ConstraintViolation`, `ConnectionFailure`) for
//!   store failures.

pub mod student_repo;
