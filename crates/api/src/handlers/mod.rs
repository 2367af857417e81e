pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod students;
pub mod timetable;

use rollcall_core::error::CoreError;
use validator::Validate;

use crate::error::AppError;

/// Run `validator` rules on a request body, mapping failures to 400.
pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
}

/// Reject blank required strings, naming the offending field.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} is required"
        ))));
    }
    Ok(())
}
