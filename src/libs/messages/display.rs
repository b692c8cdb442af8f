use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === CONFIGURATION ===
            Message::ConfigSaved => "Configuration saved successfully.".to_string(),
            Message::ConfigLocation(path) => format!("Configuration file: {}", path),

            // === DATABASE ===
            Message::DatabaseUpToDate => "Database is up to date.".to_string(),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::DatabaseLocation(path) => format!("Database file: {}", path),

            // === USERS ===
            Message::UserCreated(id) => format!("User {} created.", id),
            Message::UserUpdated(id) => format!("User {} updated.", id),
            Message::UserDeleted(id) => format!("User {} deleted.", id),
            Message::UserNotFound(id) => format!("User with id {} not found.", id),
            Message::UsernameNotFound(name) => format!("User '{}' not found.", name),
            Message::UsernameTaken(name) => format!("Username '{}' is already taken.", name),
            Message::UsersNotFound => "No users found.".to_string(),
            Message::IncorrectPassword => "Incorrect password.".to_string(),
            Message::PasswordsDoNotMatch => "Passwords do not match.".to_string(),
            Message::LoggedIn(name) => format!("Logged in as '{}'.", name),
            Message::LoggedOut => "Logged out.".to_string(),
            Message::LoggedInAs(name, id) => format!("Logged in as '{}' (id {}).", name, id),
            Message::NotLoggedIn => "Not logged in. Run `attend user login` first.".to_string(),
            Message::SessionNotFound => "Session not found or expired.".to_string(),
            Message::ConfirmDeleteUser(id) => format!("Delete user {}?", id),

            // === EMPLOYEES ===
            Message::EmployeeCreated(id) => format!("Employee {} created.", id),
            Message::EmployeeUpdated(id) => format!("Employee {} updated.", id),
            Message::EmployeeDeleted(id) => format!("Employee {} deleted.", id),
            Message::EmployeeNotFound(id) => format!("Employee with id {} not found.", id),
            Message::EmployeeNameTaken(name) => format!("Employee '{}' already exists.", name),
            Message::EmployeesNotFound => "No employees found.".to_string(),
            Message::EmployeesImported(count) => format!("Imported {} employees.", count),
            Message::ConfirmDeleteEmployee(id) => format!("Delete employee {} and their attendance?", id),

            // === ATTENDANCE ===
            Message::CheckedIn(name) => format!("{} checked in.", name),
            Message::CheckedOut(name) => format!("{} checked out.", name),
            Message::AttendanceNotFound(month) => format!("No attendance recorded for {}.", month),
            Message::AttendancePurged(count) => format!("Removed {} attendance events.", count),
            Message::TotalWorked(total) => format!("Total worked: {}", total),
            Message::ReportHeader(name, month) => format!("Attendance of {} for {}", name, month),
            Message::SummaryHeader(month) => format!("Attendance summary for {}", month),
            Message::ReportExported(path) => format!("Report exported to {}", path),
            Message::InvalidMonth(month) => format!("Invalid month: {}. Expected 1-12.", month),

            // === LISTING ===
            Message::PageOf(page, pages) => format!("Page {} of {}", page, pages),

            // === PROMPTS ===
            Message::PromptUsername => "Username".to_string(),
            Message::PromptPassword => "Password".to_string(),
            Message::PromptConfirmPassword => "Repeat password".to_string(),
            Message::PromptEmployeeName => "Employee name".to_string(),
            Message::PromptPhone => "Phone (optional)".to_string(),
            Message::PromptEmail => "Email (optional)".to_string(),
            Message::PromptAddress => "Address (optional)".to_string(),
            Message::OperationCancelled => "Operation cancelled.".to_string(),
        };
        write!(f, "{}", text)
    }
}
