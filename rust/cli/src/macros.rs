//! Output macros shared by [`crate::run`] and the JSONL readers.

/// `writeln!` that leaves `run` with [`crate::exit_code::ERROR`] when the
/// stream is gone.
///
/// ```ignore
/// write_or_exit!(err, "Usage: tablelog <command> [options]");
/// ```
#[macro_export]
macro_rules! write_or_exit {
    ($dest:expr, $($arg:tt)*) => {
        if writeln!($dest, $($arg)*).is_err() {
            return $crate::exit_code::ERROR;
        }
    };
}

/// Deserializes one history line as a stored hand. On failure the error is
/// written to `$err` with the hand index and the enclosing loop moves on.
///
/// ```ignore
/// let hand = stored_hand_or_continue!(line, err, index + 1);
/// ```
#[macro_export]
macro_rules! stored_hand_or_continue {
    ($line:expr, $err:expr, $index:expr) => {
        match serde_json::from_str::<tablelog_engine::logger::StoredHand>($line) {
            Ok(hand) => hand,
            Err(e) => {
                let _ = $crate::ui::write_error(
                    $err,
                    &format!("Failed to parse hand {}: {}", $index, e),
                );
                continue;
            }
        }
    };
}
