use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::betting::BettingRound;
use crate::cards::Card;
use crate::hand::Blinds;
use crate::seats::{Position, TableSize};

/// The hero's result for one hand.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
    Folded,
    Chopped,
}

/// Who won and what it meant for the hero.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub winners: Vec<Position>,
    /// Whole pot at the end of the hand
    pub pot_won: u32,
    /// Chips paid to each winner; sums to `pot_won`
    #[serde(default)]
    pub payouts: BTreeMap<Position, u32>,
    /// Hero stack after payout; absent without a hero seat
    #[serde(default)]
    pub stack_after: Option<u32>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

/// Complete record of a finished hand.
/// Serialized to JSONL for hand history storage and replay.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoredHand {
    /// Unique identifier for this hand (format: YYYYMMDD-NNNNNN)
    pub hand_id: String,
    pub hand_number: u32,
    /// When the hand started
    pub timestamp: DateTime<Utc>,
    pub table_size: TableSize,
    pub blinds: Blinds,
    #[serde(default)]
    pub hero: Option<Position>,
    #[serde(default)]
    pub hole_cards: Option<[Card; 2]>,
    /// Community cards in deal order (up to 5)
    #[serde(default)]
    pub board: Vec<Card>,
    /// One entry per street reached, in street order
    pub rounds: Vec<BettingRound>,
    pub stacks_before: BTreeMap<Position, u32>,
    pub stacks_after: BTreeMap<Position, u32>,
    pub result: HandResult,
}

impl StoredHand {
    /// Chips each seat put in over the whole hand.
    pub fn contributions(&self) -> BTreeMap<Position, u64> {
        let mut totals = BTreeMap::new();
        for round in &self.rounds {
            for action in round.actions() {
                totals.entry(action.position).or_insert(0);
            }
            for (seat, total) in totals.iter_mut() {
                *total += u64::from(round.committed_by(*seat));
            }
        }
        totals
    }
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Appends finished hands as JSON lines.
pub struct HandLogger<W: Write = BufWriter<File>> {
    writer: W,
    written: usize,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(f)))
    }
}

impl<W: Write> HandLogger<W> {
    pub fn from_writer(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write(&mut self, record: &StoredHand) -> std::io::Result<()> {
        let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Parses a JSONL hand history. Blank lines are skipped.
pub fn read_hands<R: BufRead>(reader: R) -> std::io::Result<Vec<StoredHand>> {
    let mut hands = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let hand = serde_json::from_str(trimmed).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("line {}: {}", i + 1, e),
            )
        })?;
        hands.push(hand);
    }
    Ok(hands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_id_is_date_and_padded_number() {
        assert_eq!(format_hand_id("20260105", 42), "20260105-000042");
    }

    #[test]
    fn outcome_serializes_lowercase() {
        let s = serde_json::to_string(&Outcome::Chopped).unwrap();
        assert_eq!(s, "\"chopped\"");
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let input = "\n{not json}\n";
        let err = read_hands(input.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("line 2:"));
    }
}
