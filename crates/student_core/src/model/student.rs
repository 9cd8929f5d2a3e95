//! Student domain model.
//!
//! # Responsibility
//! - Define the single persisted record managed by core.
//! - Provide input normalization and field validation helpers.
//!
//! # Invariants
//! - `id == 0` means the record has not been persisted yet.
//! - `id` and `created_at` are assigned by storage and never changed by updates.
//! - `email` is stored lowercase.

use crate::validate::{is_valid_age, is_valid_course, is_valid_email, is_valid_name};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned row identifier.
pub type StudentId = i64;

/// Identifier carried by records that were never persisted.
pub const UNSAVED_ID: StudentId = 0;

/// Field-level validation failures for student input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    InvalidName(String),
    InvalidEmail(String),
    InvalidAge(i32),
    InvalidCourse(String),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(_) => write!(
                f,
                "invalid name: only letters and spaces are allowed (2-50 characters)"
            ),
            Self::InvalidEmail(_) => write!(f, "invalid email format"),
            Self::InvalidAge(age) => {
                write!(f, "invalid age {age}: age should be between 1 and 149")
            }
            Self::InvalidCourse(_) => {
                write!(f, "invalid course: course name should be 2-100 characters long")
            }
        }
    }
}

impl Error for StudentValidationError {}

/// One student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Server-assigned primary key; `0` until created.
    pub id: StudentId,
    pub name: String,
    /// Unique across all rows, lowercase.
    pub email: String,
    pub age: i32,
    pub course: String,
    /// Unix epoch milliseconds set by storage at insertion.
    pub created_at: Option<i64>,
}

impl Student {
    /// Creates an unsaved student record.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
        course: impl Into<String>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            email: email.into(),
            age,
            course: course.into(),
            created_at: None,
        }
    }

    /// Returns whether storage has assigned an identity to this record.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    /// Returns a copy with trimmed text fields and a lowercase email.
    ///
    /// Identity and `created_at` are carried over unchanged.
    pub fn normalized(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            age: self.age,
            course: self.course.trim().to_string(),
            created_at: self.created_at,
        }
    }

    /// Checks the four user-supplied fields, reporting the first failure.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if !is_valid_name(&self.name) {
            return Err(StudentValidationError::InvalidName(self.name.clone()));
        }
        if !is_valid_email(&self.email) {
            return Err(StudentValidationError::InvalidEmail(self.email.clone()));
        }
        if !is_valid_age(self.age) {
            return Err(StudentValidationError::InvalidAge(self.age));
        }
        if !is_valid_course(&self.course) {
            return Err(StudentValidationError::InvalidCourse(self.course.clone()));
        }
        Ok(())
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Student{{id={}, name='{}', email='{}', age={}, course='{}'}}",
            self.id, self.name, self.email, self.age, self.course
        )
    }
}
