//! Card, board, and action formatters for terminal display.
//!
//! Card tokens are shown with Unicode suit symbols where the terminal
//! supports them (♥ ♦ ♣ ♠), falling back to the recorded letters.
//!
//! ## Example
//!
//! ```rust
//! use tablelog_engine::cards::Card;
//! use tablelog_cli::formatters::{format_board, format_card};
//!
//! let ace = Card::new("As").unwrap();
//! assert!(format_card(&ace) == "A♠" || format_card(&ace) == "As");
//! assert!(format_board(&[ace]).starts_with("[A"));
//! ```

use std::collections::BTreeMap;

use tablelog_engine::betting::{ActionKind, BettingAction};
use tablelog_engine::cards::Card;
use tablelog_engine::seats::Position;

/// Check if the terminal supports Unicode card symbols by detecting modern terminal environments.
///
/// On Windows, checks for Windows Terminal (WT_SESSION), modern terminals (TERM_PROGRAM),
/// or VS Code (VSCODE_INJECTION). On Unix-like systems, assumes Unicode support.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

fn suit_symbol(suit: char) -> Option<char> {
    match suit.to_ascii_lowercase() {
        'h' => Some('♥'),
        'd' => Some('♦'),
        'c' => Some('♣'),
        's' => Some('♠'),
        _ => None,
    }
}

/// Format a card token, swapping suit letters for symbols when supported.
pub fn format_card(card: &Card) -> String {
    match suit_symbol(card.suit()) {
        Some(sym) if supports_unicode() => format!("{}{}", card.rank(), sym),
        _ => card.to_string(),
    }
}

pub fn format_board(cards: &[Card]) -> String {
    let formatted: Vec<String> = cards.iter().map(format_card).collect();
    format!("[{}]", formatted.join(" "))
}

/// Human-readable action line, e.g. "CO raises to 30".
///
/// # Example
///
/// ```rust
/// use tablelog_engine::betting::BettingAction;
/// use tablelog_engine::seats::Position;
/// # use tablelog_cli::formatters::format_action;
///
/// assert_eq!(format_action(&BettingAction::fold(Position::Utg)), "UTG folds");
/// assert_eq!(format_action(&BettingAction::raise(Position::Cutoff, 30)), "CO raises to 30");
/// ```
pub fn format_action(action: &BettingAction) -> String {
    let seat = action.position;
    let amount = action.amount;
    let text = match action.kind {
        ActionKind::Fold => format!("{} folds", seat),
        ActionKind::Check => format!("{} checks", seat),
        ActionKind::Call => format!("{} calls {}", seat, amount),
        ActionKind::Raise => format!("{} raises to {}", seat, amount),
        ActionKind::AllIn => format!("{} is all-in for {}", seat, amount),
        ActionKind::SmallBlind => format!("{} posts small blind {}", seat, amount),
        ActionKind::BigBlind => format!("{} posts big blind {}", seat, amount),
        ActionKind::Straddle => format!("{} straddles {}", seat, amount),
    };
    if action.auto {
        format!("{} (auto)", text)
    } else {
        text
    }
}

/// `BTN 1040, SB 970` in table order.
pub fn format_stacks(stacks: &BTreeMap<Position, u32>) -> String {
    stacks
        .iter()
        .map(|(seat, chips)| format!("{} {}", seat, chips))
        .collect::<Vec<_>>()
        .join(", ")
}
