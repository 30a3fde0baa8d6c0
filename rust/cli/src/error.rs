//! Error types for the CLI application.
//!
//! Every command handler returns `Result<(), CliError>`; [`crate::run`]
//! prints the error once and exits with [`crate::exit_code::ERROR`].
//! Script failures carry the 1-based script line through
//! [`CliError::at_line`], and verify collects one
//! [`BatchValidationError`] per failing hand.

use std::fmt;

use tablelog_engine::errors::HandError;

#[derive(Debug)]
pub enum CliError {
    /// File or stream failure
    Io(std::io::Error),
    /// Unreadable script, history or argument
    InvalidInput(String),
    /// Configuration file or environment value rejected
    Config(String),
    /// The engine refused an operation from a script
    Engine(String),
}

impl CliError {
    /// Prefixes the message with `line N: `. I/O errors are returned as is.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            CliError::InvalidInput(msg) => CliError::InvalidInput(format!("line {}: {}", line, msg)),
            CliError::Config(msg) => CliError::Config(format!("line {}: {}", line, msg)),
            CliError::Engine(msg) => CliError::Engine(format!("line {}: {}", line, msg)),
            io @ CliError::Io(_) => io,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<HandError> for CliError {
    fn from(error: HandError) -> Self {
        CliError::Engine(error.to_string())
    }
}

// read_text_auto and parse_script_line report plain strings
impl From<String> for CliError {
    fn from(error: String) -> Self {
        CliError::InvalidInput(error)
    }
}

/// One failed check inside a batch, tagged with the item it belongs to.
///
/// # Examples
///
/// ```rust
/// use tablelog_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "pot does not match commitments".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: pot does not match commitments");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    pub item_context: T,
    pub message: String,
}

impl<T: fmt::Display> fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablelog_engine::seats::Position;

    #[test]
    fn test_hand_error_becomes_engine_error() {
        let err: CliError = HandError::OutOfTurnAction {
            expected: Some(Position::Utg),
            actual: Position::Button,
        }
        .into();
        assert!(matches!(err, CliError::Engine(_)));
        assert!(err.to_string().starts_with("Engine error: BTN"));
    }

    #[test]
    fn test_at_line_prefixes_message() {
        let err = CliError::from("Invalid amount 'x'".to_string()).at_line(7);
        assert_eq!(err.to_string(), "Invalid input: line 7: Invalid amount 'x'");
        let io = CliError::Io(std::io::Error::other("disk full")).at_line(7);
        assert_eq!(io.to_string(), "I/O error: disk full");
    }
}
