use thiserror::Error;

use crate::betting::ActionKind;
use crate::seats::Position;

/// Every failure the hand engine can report. All of them are recoverable:
/// the hand is left exactly as it was before the rejected call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandError {
    #[error("{actual} cannot act now (next to act: {})", seat_or_nobody(.expected))]
    OutOfTurnAction {
        expected: Option<Position>,
        actual: Position,
    },
    #[error("Invalid raise amount: {amount}, allowed range: {minimum}..={maximum}")]
    InvalidRaiseAmount {
        amount: u32,
        minimum: u32,
        maximum: u32,
    },
    #[error("{actual} cannot act before {first} has acted preflop")]
    ActingBeforeFirstPosition { first: Position, actual: Position },
    #[error("Cannot advance yet: {0}")]
    PrematureAdvance(String),
    #[error("Hand already finished")]
    HandAlreadyFinished,
    #[error("No active seats left in rotation")]
    NoActiveSeats,
    #[error("Cannot check while facing a bet of {to_call}")]
    CheckFacingBet { to_call: u32 },
    #[error("{0} is posted by the hand, it cannot be submitted as an action")]
    ForcedBet(ActionKind),
    #[error("Straddle not available: {0}")]
    StraddleUnavailable(String),
    #[error("{0} cannot win this pot")]
    InvalidWinner(Position),
    #[error("Card {0} appears twice in this hand")]
    DuplicateCard(String),
    #[error("Invalid card token: {0:?}")]
    InvalidCard(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown seat: {0}")]
    UnknownSeat(String),
}

fn seat_or_nobody(seat: &Option<Position>) -> String {
    match seat {
        Some(p) => p.to_string(),
        None => "nobody".to_string(),
    }
}
