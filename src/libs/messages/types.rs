/// Every user-facing message the application prints or returns.
///
/// Text lives in the `Display` impl in `display.rs`.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION ===
    ConfigSaved,
    ConfigLocation(String),

    // === DATABASE ===
    DatabaseUpToDate,
    RunningMigration(u32, String), // version, name
    DatabaseLocation(String),

    // === USERS ===
    UserCreated(i64),
    UserUpdated(i64),
    UserDeleted(i64),
    UserNotFound(i64),
    UsernameNotFound(String),
    UsernameTaken(String),
    UsersNotFound,
    IncorrectPassword,
    PasswordsDoNotMatch,
    LoggedIn(String),
    LoggedOut,
    LoggedInAs(String, i64), // username, id
    NotLoggedIn,
    SessionNotFound,
    ConfirmDeleteUser(i64),

    // === EMPLOYEES ===
    EmployeeCreated(i64),
    EmployeeUpdated(i64),
    EmployeeDeleted(i64),
    EmployeeNotFound(i64),
    EmployeeNameTaken(String),
    EmployeesNotFound,
    EmployeesImported(usize),
    ConfirmDeleteEmployee(i64),

    // === ATTENDANCE ===
    CheckedIn(String),  // employee name
    CheckedOut(String), // employee name
    AttendanceNotFound(String),
    AttendancePurged(usize),
    TotalWorked(String),
    ReportHeader(String, String), // employee name, month
    SummaryHeader(String),        // month
    ReportExported(String),
    InvalidMonth(u32),

    // === LISTING ===
    PageOf(u64, u64), // page, pages

    // === PROMPTS ===
    PromptUsername,
    PromptPassword,
    PromptConfirmPassword,
    PromptEmployeeName,
    PromptPhone,
    PromptEmail,
    PromptAddress,
    OperationCancelled,
}
