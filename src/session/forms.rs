//! Client-side checks for the credential forms. A failing check never reaches
//! the network.

use crate::error::{ConsoleError, ConsoleResult};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_admin_password(password: &str, confirm: &str) -> ConsoleResult<()> {
    if password.is_empty() || confirm.is_empty() {
        return Err(ConsoleError::validation("Both password fields are required."));
    }
    if password != confirm {
        return Err(ConsoleError::validation("Passwords do not match."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ConsoleError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

pub fn validate_login(password: &str) -> ConsoleResult<()> {
    if password.is_empty() {
        return Err(ConsoleError::validation("Password is required."));
    }
    Ok(())
}

pub fn validate_password_change(current: &str, new: &str, repeat: &str) -> ConsoleResult<()> {
    if current.is_empty() || new.is_empty() || repeat.is_empty() {
        return Err(ConsoleError::validation("All fields are required."));
    }
    if new != repeat {
        return Err(ConsoleError::validation("New passwords do not match."));
    }
    Ok(())
}
