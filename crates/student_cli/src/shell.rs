//! Interactive menu over the student service.
//!
//! # Responsibility
//! - Prompt for input, pre-filter it with the field validators, and call the
//!   service.
//! - Render records and map store failures to user-facing messages.
//!
//! # Invariants
//! - Deletion requires an explicit `yes`.
//! - End of input ends the session cleanly.
//! - Log events carry metadata only, never record contents.

use log::{info, warn};
use std::io::{self, BufRead, Write};
use student_core::{
    is_valid_age, is_valid_course, is_valid_email, is_valid_name, ServiceError, StoreError,
    Student, StudentId, StudentRepository, StudentService,
};

const TABLE_WIDTH: usize = 80;
const DETAILS_WIDTH: usize = 40;
const MENU_WIDTH: usize = 50;

pub struct Shell<S: StudentRepository, R: BufRead, W: Write> {
    service: StudentService<S>,
    input: R,
    output: W,
}

impl<S: StudentRepository, R: BufRead, W: Write> Shell<S, R, W> {
    pub fn new(service: StudentService<S>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs the menu loop until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        info!("event=shell_start module=shell status=ok");
        writeln!(self.output, "=== Student Database Management System ===")?;

        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt_int("Enter your choice: ")? else {
                break;
            };

            match choice {
                1 => self.add_student()?,
                2 => self.view_all_students()?,
                3 => self.search_students()?,
                4 => self.update_student()?,
                5 => self.delete_student()?,
                6 => self.view_student_details()?,
                7 => {
                    writeln!(self.output, "Thank you for using Student Database System!")?;
                    break;
                }
                _ => writeln!(self.output, "Invalid choice! Please try again.")?,
            }
        }

        info!("event=shell_exit module=shell status=ok");
        Ok(())
    }

    /// Releases the store connection.
    pub fn close(&mut self) -> Result<(), ServiceError> {
        self.service.close()
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(MENU_WIDTH);
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "1. Add New Student")?;
        writeln!(self.output, "2. View All Students")?;
        writeln!(self.output, "3. Search Students by Name")?;
        writeln!(self.output, "4. Update Student Information")?;
        writeln!(self.output, "5. Delete Student")?;
        writeln!(self.output, "6. View Student Details")?;
        writeln!(self.output, "7. Exit")?;
        writeln!(self.output, "{rule}")
    }

    fn add_student(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Add New Student ---")?;

        let Some(name) = self.prompt_valid(
            "Enter student name: ",
            is_valid_name,
            "Invalid name! Name should contain only letters and spaces (2-50 characters).",
        )?
        else {
            return Ok(());
        };
        let Some(email) = self.prompt_valid(
            "Enter student email: ",
            is_valid_email,
            "Invalid email format! Please enter a valid email address.",
        )?
        else {
            return Ok(());
        };
        let Some(age) = self.prompt_valid_age("Enter student age: ")? else {
            return Ok(());
        };
        let Some(course) = self.prompt_valid(
            "Enter course name: ",
            is_valid_course,
            "Invalid course! Course name should be 2-100 characters long.",
        )?
        else {
            return Ok(());
        };

        match self.service.register(&name, &email, age, &course) {
            Ok(student) => writeln!(
                self.output,
                "✓ Student added successfully with ID: {}",
                student.id
            ),
            Err(err) => self.report_error("adding student", &err),
        }
    }

    fn view_all_students(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- All Students ---")?;

        match self.service.list_all() {
            Ok(students) if students.is_empty() => {
                writeln!(self.output, "No students found in the database.")
            }
            Ok(students) => self.print_table(&students),
            Err(err) => self.report_error("retrieving students", &err),
        }
    }

    fn search_students(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Search Students ---")?;

        let Some(fragment) = self.prompt_line("Enter name to search: ")? else {
            return Ok(());
        };
        match self.service.search(&fragment) {
            Ok(students) if students.is_empty() => {
                writeln!(self.output, "No students found matching: {fragment}")
            }
            Ok(students) => self.print_table(&students),
            Err(err) => self.report_error("searching students", &err),
        }
    }

    fn update_student(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Update Student ---")?;

        let Some(existing) =
            self.prompt_existing("Enter student ID to update: ", "updating student")?
        else {
            return Ok(());
        };

        writeln!(self.output, "Current details: {existing}")?;
        writeln!(
            self.output,
            "Enter new details (press Enter to keep current value):"
        )?;

        let Some(name) = self.prompt_with_default("Name", &existing.name)? else {
            return Ok(());
        };
        let Some(email) = self.prompt_email_with_default("Email", &existing.email)? else {
            return Ok(());
        };
        let Some(age) = self.prompt_age_with_default("Age", existing.age)? else {
            return Ok(());
        };
        let Some(course) = self.prompt_with_default("Course", &existing.course)? else {
            return Ok(());
        };

        let updated = Student {
            name,
            email,
            age,
            course,
            ..existing
        };
        match self.service.update_student(&updated) {
            Ok(true) => writeln!(self.output, "✓ Student updated successfully."),
            Ok(false) => writeln!(self.output, "✗ Failed to update student."),
            Err(err) => self.report_error("updating student", &err),
        }
    }

    fn delete_student(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Delete Student ---")?;

        let Some(student) =
            self.prompt_existing("Enter student ID to delete: ", "deleting student")?
        else {
            return Ok(());
        };

        writeln!(self.output, "Student to delete: {student}")?;
        let Some(confirmation) = self.prompt_line("Are you sure? (yes/no): ")? else {
            return Ok(());
        };
        if !confirmation.eq_ignore_ascii_case("yes") {
            return writeln!(self.output, "Delete operation cancelled.");
        }

        match self.service.remove(student.id) {
            Ok(true) => writeln!(self.output, "✓ Student deleted successfully."),
            Ok(false) => writeln!(self.output, "✗ Failed to delete student."),
            Err(err) => self.report_error("deleting student", &err),
        }
    }

    fn view_student_details(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- View Student Details ---")?;

        let Some(student) =
            self.prompt_existing("Enter student ID: ", "retrieving student details")?
        else {
            return Ok(());
        };

        let rule = "=".repeat(DETAILS_WIDTH);
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "STUDENT DETAILS")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "ID:     {}", student.id)?;
        writeln!(self.output, "Name:   {}", student.name)?;
        writeln!(self.output, "Email:  {}", student.email)?;
        writeln!(self.output, "Age:    {}", student.age)?;
        writeln!(self.output, "Course: {}", student.course)?;
        writeln!(self.output, "{rule}")
    }

    /// Prompts for an id and loads the row, printing a message when absent.
    fn prompt_existing(
        &mut self,
        prompt: &str,
        operation: &str,
    ) -> io::Result<Option<Student>> {
        let Some(id) = self.prompt_int(prompt)? else {
            return Ok(None);
        };
        let id = StudentId::from(id);

        match self.service.get(id) {
            Ok(Some(student)) => Ok(Some(student)),
            Ok(None) => {
                writeln!(self.output, "Student with ID {id} not found.")?;
                Ok(None)
            }
            Err(err) => {
                self.report_error(operation, &err)?;
                Ok(None)
            }
        }
    }

    fn print_table(&mut self, students: &[Student]) -> io::Result<()> {
        let rule = "=".repeat(TABLE_WIDTH);
        writeln!(self.output, "\n{rule}")?;
        writeln!(
            self.output,
            "{:<5} {:<20} {:<25} {:<5} {:<20}",
            "ID", "Name", "Email", "Age", "Course"
        )?;
        writeln!(self.output, "{rule}")?;

        for student in students {
            writeln!(
                self.output,
                "{:<5} {:<20} {:<25} {:<5} {:<20}",
                student.id,
                truncate(&student.name, 20),
                truncate(&student.email, 25),
                student.age,
                truncate(&student.course, 20)
            )?;
        }

        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "Total students: {}", students.len())
    }

    fn report_error(&mut self, operation: &str, err: &ServiceError) -> io::Result<()> {
        let (kind, message) = describe_error(err);
        warn!("event=store_error module=shell operation={operation:?} kind={kind}");

        writeln!(self.output, "Database error while {operation}:")?;
        writeln!(self.output, "✗ {message}")
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_int(&mut self, prompt: &str) -> io::Result<Option<i32>> {
        loop {
            let Some(line) = self.prompt_line(prompt)? else {
                return Ok(None);
            };
            match line.parse::<i32>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Invalid input! Please enter a valid number.")?,
            }
        }
    }

    fn prompt_valid(
        &mut self,
        prompt: &str,
        accept: fn(&str) -> bool,
        rejection: &str,
    ) -> io::Result<Option<String>> {
        loop {
            let Some(line) = self.prompt_line(prompt)? else {
                return Ok(None);
            };
            if accept(&line) {
                return Ok(Some(line));
            }
            writeln!(self.output, "{rejection}")?;
        }
    }

    fn prompt_valid_age(&mut self, prompt: &str) -> io::Result<Option<i32>> {
        loop {
            let Some(age) = self.prompt_int(prompt)? else {
                return Ok(None);
            };
            if is_valid_age(age) {
                return Ok(Some(age));
            }
            writeln!(self.output, "Invalid age! Age should be between 1 and 149.")?;
        }
    }

    fn prompt_with_default(&mut self, field: &str, current: &str) -> io::Result<Option<String>> {
        let Some(line) = self.prompt_line(&format!("{field} [{current}]: "))? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(Some(current.to_string()));
        }
        Ok(Some(line))
    }

    fn prompt_email_with_default(
        &mut self,
        field: &str,
        current: &str,
    ) -> io::Result<Option<String>> {
        loop {
            let Some(value) = self.prompt_with_default(field, current)? else {
                return Ok(None);
            };
            if value == current || is_valid_email(&value) {
                return Ok(Some(value));
            }
            writeln!(self.output, "Invalid email format!")?;
        }
    }

    fn prompt_age_with_default(&mut self, field: &str, current: i32) -> io::Result<Option<i32>> {
        loop {
            let Some(line) = self.prompt_line(&format!("{field} [{current}]: "))? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(current));
            }
            match line.parse::<i32>() {
                Ok(age) if is_valid_age(age) => return Ok(Some(age)),
                Ok(_) => writeln!(self.output, "Invalid age! Age should be between 1 and 149.")?,
                Err(_) => writeln!(self.output, "Invalid input! Please enter a valid number.")?,
            }
        }
    }
}

/// Maps a service failure to a log-safe kind and a user-facing message.
fn describe_error(err: &ServiceError) -> (&'static str, String) {
    match err {
        ServiceError::Invalid(invalid) => ("invalid_input", invalid.to_string()),
        ServiceError::Store(StoreError::DuplicateKey { .. }) => (
            "duplicate_key",
            "Duplicate entry - Email already exists!".to_string(),
        ),
        ServiceError::Store(StoreError::ConstraintViolation(_)) => (
            "constraint_violation",
            "Data rejected by database constraints!".to_string(),
        ),
        ServiceError::Store(StoreError::ConnectionFailure(inner)) => {
            ("connection_failure", format!("Connection failure: {inner}"))
        }
        ServiceError::Store(other) => ("db_error", other.to_string()),
    }
}

/// Shortens `value` to at most `max_chars` characters, marking cuts with `...`.
fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::{describe_error, truncate, Shell};
    use std::io::Cursor;
    use student_core::{
        ServiceError, SqliteStudentStore, StoreError, Student, StudentRepository, StudentService,
        StudentValidationError,
    };

    type TestShell = Shell<SqliteStudentStore, Cursor<Vec<u8>>, Vec<u8>>;

    fn shell_with_input(store: SqliteStudentStore, input: &str) -> TestShell {
        Shell::new(
            StudentService::new(store),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn run_session(store: SqliteStudentStore, input: &str) -> String {
        let mut shell = shell_with_input(store, input);
        shell.run().unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    fn seeded_store() -> SqliteStudentStore {
        let store = SqliteStudentStore::open_in_memory().unwrap();
        store
            .create(&Student::new("Ann Lee", "ann@x.com", 20, "CS"))
            .unwrap();
        store
    }

    #[test]
    fn truncate_marks_long_values() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("exactly8", 8), "exactly8");
    }

    #[test]
    fn describe_error_maps_taxonomy() {
        let duplicate = ServiceError::Store(StoreError::DuplicateKey {
            email: "ann@x.com".to_string(),
        });
        assert_eq!(describe_error(&duplicate).0, "duplicate_key");
        assert!(describe_error(&duplicate).1.contains("Email already exists"));

        let invalid = ServiceError::Invalid(StudentValidationError::InvalidAge(0));
        assert_eq!(describe_error(&invalid).0, "invalid_input");
    }

    #[test]
    fn add_reprompts_until_fields_are_valid() {
        let store = SqliteStudentStore::open_in_memory().unwrap();
        let output = run_session(
            store,
            "1\nAnn123\nAnn Lee\nnot-an-email\nAnn@X.com\n0\nabc\n20\nC\nCS\n7\n",
        );

        assert!(output.contains("Invalid name!"));
        assert!(output.contains("Invalid email format!"));
        assert!(output.contains("Invalid age!"));
        assert!(output.contains("Invalid input! Please enter a valid number."));
        assert!(output.contains("Invalid course!"));
        assert!(output.contains("Student added successfully with ID: 1"));
        assert!(output.contains("Thank you for using Student Database System!"));
    }

    #[test]
    fn duplicate_email_is_reported() {
        let output = run_session(seeded_store(), "1\nAnn Other\nann@x.com\n30\nArt\n7\n");

        assert!(output.contains("Database error while adding student:"));
        assert!(output.contains("Duplicate entry - Email already exists!"));
    }

    #[test]
    fn view_all_renders_table_with_total() {
        let output = run_session(seeded_store(), "2\n7\n");

        assert!(output.contains("Ann Lee"));
        assert!(output.contains("ann@x.com"));
        assert!(output.contains("Total students: 1"));
    }

    #[test]
    fn search_without_match_says_so() {
        let output = run_session(seeded_store(), "3\nZed\n7\n");
        assert!(output.contains("No students found matching: Zed"));
    }

    #[test]
    fn update_keeps_blank_fields() {
        let store = seeded_store();
        let mut shell = shell_with_input(store, "4\n1\n\nAnn.Lee@Y.org\n21\n\n7\n");
        shell.run().unwrap();

        let updated = shell.service.get(1).unwrap().unwrap();
        assert_eq!(updated.name, "Ann Lee");
        assert_eq!(updated.email, "ann.lee@y.org");
        assert_eq!(updated.age, 21);
        assert_eq!(updated.course, "CS");

        let output = String::from_utf8(shell.into_output()).unwrap();
        assert!(output.contains("Current details: Student{id=1, name='Ann Lee'"));
        assert!(output.contains("Student updated successfully."));
    }

    #[test]
    fn delete_requires_yes() {
        let output = run_session(seeded_store(), "5\n1\nno\n5\n1\nYES\n6\n1\n7\n");

        assert!(output.contains("Delete operation cancelled."));
        assert!(output.contains("Student deleted successfully."));
        assert!(output.contains("Student with ID 1 not found."));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let output = run_session(SqliteStudentStore::open_in_memory().unwrap(), "1\nAnn Lee\n");
        assert!(!output.contains("Thank you"));
    }

    #[test]
    fn invalid_menu_choice_is_reported() {
        let output = run_session(SqliteStudentStore::open_in_memory().unwrap(), "9\n7\n");
        assert!(output.contains("Invalid choice! Please try again."));
    }
}
