//! Seat labels and turn rotation for 6-max and 9-max tables.
//!
//! The canonical order of [`Position`] is the rotation order. A 6-max table
//! uses a subsequence of the 9-max labels, so the derived `Ord` is valid for
//! both sizes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::HandError;

/// A seat label. `Dealer` is the non-playing dealer marker and never acts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "DEALER")]
    Dealer,
    #[serde(rename = "BTN")]
    Button,
    #[serde(rename = "SB")]
    SmallBlind,
    #[serde(rename = "BB")]
    BigBlind,
    #[serde(rename = "UTG")]
    Utg,
    #[serde(rename = "UTG+1")]
    Utg1,
    #[serde(rename = "UTG+2")]
    Utg2,
    #[serde(rename = "LJ")]
    Lojack,
    #[serde(rename = "HJ")]
    Hijack,
    #[serde(rename = "CO")]
    Cutoff,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Dealer => "DEALER",
            Position::Button => "BTN",
            Position::SmallBlind => "SB",
            Position::BigBlind => "BB",
            Position::Utg => "UTG",
            Position::Utg1 => "UTG+1",
            Position::Utg2 => "UTG+2",
            Position::Lojack => "LJ",
            Position::Hijack => "HJ",
            Position::Cutoff => "CO",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        NINE_MAX
            .iter()
            .copied()
            .find(|p| p.label() == wanted)
            .ok_or_else(|| HandError::UnknownSeat(s.to_string()))
    }
}

const SIX_MAX: [Position; 7] = [
    Position::Dealer,
    Position::Button,
    Position::SmallBlind,
    Position::BigBlind,
    Position::Utg,
    Position::Lojack,
    Position::Cutoff,
];

const NINE_MAX: [Position; 10] = [
    Position::Dealer,
    Position::Button,
    Position::SmallBlind,
    Position::BigBlind,
    Position::Utg,
    Position::Utg1,
    Position::Utg2,
    Position::Lojack,
    Position::Hijack,
    Position::Cutoff,
];

/// Number of playing seats at the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TableSize {
    Six,
    Nine,
}

impl TableSize {
    pub fn from_seats(seats: u8) -> Result<Self, HandError> {
        match seats {
            6 => Ok(TableSize::Six),
            9 => Ok(TableSize::Nine),
            n => Err(HandError::InvalidConfig(format!(
                "table size must be 6 or 9, got {}",
                n
            ))),
        }
    }

    pub fn seat_count(self) -> u8 {
        match self {
            TableSize::Six => 6,
            TableSize::Nine => 9,
        }
    }

    /// Canonical order including the dealer marker.
    pub fn positions(self) -> &'static [Position] {
        match self {
            TableSize::Six => &SIX_MAX,
            TableSize::Nine => &NINE_MAX,
        }
    }

    /// Playing seats in rotation order (dealer marker excluded).
    pub fn seats(self) -> &'static [Position] {
        &self.positions()[1..]
    }

    pub fn has_seat(self, position: Position) -> bool {
        self.seats().contains(&position)
    }

    pub fn index_of(self, position: Position) -> Option<usize> {
        self.positions().iter().position(|p| *p == position)
    }
}

impl TryFrom<u8> for TableSize {
    type Error = HandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TableSize::from_seats(value)
    }
}

impl From<TableSize> for u8 {
    fn from(size: TableSize) -> Self {
        size.seat_count()
    }
}

impl fmt::Display for TableSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-max", self.seat_count())
    }
}

/// Every playing seat once, starting strictly after `start` and wrapping.
/// `start` itself comes last when it is a playing seat.
pub fn rotation_from(table: TableSize, start: Position) -> impl Iterator<Item = Position> {
    let seats = table.seats();
    let split = seats
        .iter()
        .position(|s| *s > start)
        .unwrap_or(seats.len());
    seats[split..].iter().chain(seats[..split].iter()).copied()
}

/// Next seat after `from` (wrapping) that is a member of `active`.
pub fn next_active_seat(
    table: TableSize,
    from: Position,
    active: &[Position],
) -> Result<Position, HandError> {
    rotation_from(table, from)
        .find(|p| active.contains(p))
        .ok_or(HandError::NoActiveSeats)
}
