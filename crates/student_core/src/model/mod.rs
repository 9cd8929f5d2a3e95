//! Domain model for student records.
//!
//! # Responsibility
//! - Define the canonical record shared by storage, service and shell.
//!
//! # Invariants
//! - Every persisted record is identified by a storage-assigned `StudentId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod student;
