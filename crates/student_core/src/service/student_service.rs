//! Student use-case service.
//!
//! # Responsibility
//! - Normalize and validate input before it reaches the store.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - No write reaches the repository without passing `Student::validate()`.
//! - Missing rows are reported as `None`/`false`, matching the repository.

use crate::model::student::{Student, StudentId, StudentValidationError};
use crate::repo::student_repo::{StoreError, StudentRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for student use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input was rejected before any store call.
    Invalid(StudentValidationError),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StudentValidationError> for ServiceError {
    fn from(value: StudentValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Student service facade over repository implementations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Normalizes, validates and persists a new student.
    ///
    /// # Contract
    /// - Name and course are trimmed; email is trimmed and lowercased.
    /// - Returns the created record with its assigned `id`.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        age: i32,
        course: &str,
    ) -> ServiceResult<Student> {
        let student = Student::new(name, email, age, course).normalized();
        student.validate()?;
        Ok(self.repo.create(&student)?)
    }

    /// Normalizes, validates and overwrites an existing student.
    ///
    /// Returns `Ok(false)` when no row has `student.id`.
    pub fn update_student(&self, student: &Student) -> ServiceResult<bool> {
        let student = student.normalized();
        student.validate()?;
        Ok(self.repo.update(&student)?)
    }

    pub fn get(&self, id: StudentId) -> ServiceResult<Option<Student>> {
        Ok(self.repo.get_by_id(id)?)
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.get_all()?)
    }

    /// Name search; surrounding whitespace in `fragment` is ignored.
    pub fn search(&self, fragment: &str) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.search_by_name(fragment.trim())?)
    }

    pub fn remove(&self, id: StudentId) -> ServiceResult<bool> {
        Ok(self.repo.delete(id)?)
    }

    pub fn count(&self) -> ServiceResult<u64> {
        Ok(self.repo.count()?)
    }

    /// Closes the underlying repository connection.
    pub fn close(&mut self) -> ServiceResult<()> {
        Ok(self.repo.close()?)
    }
}
