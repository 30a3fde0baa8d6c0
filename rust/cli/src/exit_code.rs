//! Process exit codes.

use crate::error::CliError;

pub const SUCCESS: i32 = 0;

/// Any failure: bad arguments, unreadable input, rejected script line or
/// failed verification.
pub const ERROR: i32 = 2;

pub fn for_result(result: &Result<(), CliError>) -> i32 {
    match result {
        Ok(()) => SUCCESS,
        Err(_) => ERROR,
    }
}
