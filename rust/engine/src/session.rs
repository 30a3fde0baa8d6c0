use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::HandError;
use crate::hand::{Blinds, CurrentHand};
use crate::logger::StoredHand;
use crate::seats::{Position, TableSize};

/// Table setup shared by every hand of a session.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub table_size: TableSize,
    pub blinds: Blinds,
    /// Starting stack per seated position
    pub stacks: BTreeMap<Position, u32>,
    #[serde(default)]
    pub hero: Option<Position>,
}

impl SessionConfig {
    pub fn new(table_size: TableSize, small_blind: u32, big_blind: u32) -> Self {
        Self {
            table_size,
            blinds: Blinds::new(small_blind, big_blind),
            stacks: BTreeMap::new(),
            hero: None,
        }
    }

    /// Seats every position of the table with the same stack.
    pub fn with_uniform_stacks(mut self, stack: u32) -> Self {
        self.stacks = self
            .table_size
            .seats()
            .iter()
            .map(|p| (*p, stack))
            .collect();
        self
    }

    pub fn with_stack(mut self, position: Position, stack: u32) -> Self {
        self.stacks.insert(position, stack);
        self
    }

    pub fn with_hero(mut self, hero: Position) -> Self {
        self.hero = Some(hero);
        self
    }

    pub fn validate(&self) -> Result<(), HandError> {
        let table = self.table_size;
        let seated = self.stacks.keys().chain(self.hero.iter());
        for seat in seated {
            if *seat == Position::Dealer {
                return Err(HandError::InvalidConfig(
                    "DEALER is a marker, not a seat".into(),
                ));
            }
            if !table.has_seat(*seat) {
                return Err(HandError::InvalidConfig(format!(
                    "{} does not exist at a {} table",
                    seat, table
                )));
            }
        }
        if self.blinds.big_blind < self.blinds.small_blind {
            return Err(HandError::InvalidConfig(format!(
                "big blind {} is smaller than small blind {}",
                self.blinds.big_blind, self.blinds.small_blind
            )));
        }
        if self.stacks.len() < 2 {
            return Err(HandError::InvalidConfig(
                "at least two seats are required".into(),
            ));
        }
        ensure_chip_total(&self.stacks)
    }
}

/// Pots and payouts are `u32`, so every chip at the table must fit in one.
pub(crate) fn ensure_chip_total(stacks: &BTreeMap<Position, u32>) -> Result<(), HandError> {
    let total: u64 = stacks.values().map(|&s| u64::from(s)).sum();
    if total > u64::from(u32::MAX) {
        return Err(HandError::InvalidConfig(format!(
            "table holds {} chips in total, at most {} are supported",
            total,
            u32::MAX
        )));
    }
    Ok(())
}

/// A run of hands at one table. Stacks carry from hand to hand.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    stacks: BTreeMap<Position, u32>,
    hand_number: u32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, HandError> {
        config.validate()?;
        let stacks = config.stacks.clone();
        Ok(Self {
            config,
            stacks,
            hand_number: 0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stacks(&self) -> &BTreeMap<Position, u32> {
        &self.stacks
    }

    /// Number of the most recently started hand; 0 before the first.
    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    /// Deals the next hand with the carried stacks. Busted seats sit out.
    pub fn start_hand(&mut self) -> Result<CurrentHand, HandError> {
        let hand = CurrentHand::start(&self.config, self.hand_number + 1, &self.stacks)?;
        self.hand_number += 1;
        Ok(hand)
    }

    /// Finalizes `hand` and carries its stacks into the next hand.
    pub fn record(&mut self, hand: &mut CurrentHand) -> Result<StoredHand, HandError> {
        let stored = hand.finalize()?;
        for (seat, stack) in &stored.stacks_after {
            self.stacks.insert(*seat, *stack);
        }
        let seats_left = self.stacks.values().filter(|s| **s > 0).count();
        info!(
            hand_id = %stored.hand_id,
            seats_left,
            "stacks carried to next hand"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_seat_for_six_max() {
        let cfg = SessionConfig::new(TableSize::Six, 5, 10)
            .with_uniform_stacks(1_000)
            .with_stack(Position::Utg1, 1_000);
        assert!(matches!(cfg.validate(), Err(HandError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_dealer_seat_and_inverted_blinds() {
        let dealer = SessionConfig::new(TableSize::Nine, 5, 10)
            .with_uniform_stacks(500)
            .with_stack(Position::Dealer, 500);
        assert!(dealer.validate().is_err());

        let inverted = SessionConfig::new(TableSize::Nine, 10, 5).with_uniform_stacks(500);
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn uniform_stacks_cover_every_seat() {
        let cfg = SessionConfig::new(TableSize::Nine, 1, 2).with_uniform_stacks(200);
        assert_eq!(cfg.stacks.len(), 9);
        assert!(!cfg.stacks.contains_key(&Position::Dealer));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_more_chips_than_a_pot_can_hold() {
        let cfg = SessionConfig::new(TableSize::Six, 5, 10).with_uniform_stacks(1_000_000_000);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, HandError::InvalidConfig(msg) if msg.contains("6000000000")));

        let fits = SessionConfig::new(TableSize::Six, 5, 10).with_uniform_stacks(700_000_000);
        assert!(fits.validate().is_ok());
    }

    #[test]
    fn hand_numbers_increase() {
        let mut session =
            Session::new(SessionConfig::new(TableSize::Six, 5, 10).with_uniform_stacks(100))
                .unwrap();
        assert_eq!(session.hand_number(), 0);
        let hand = session.start_hand().unwrap();
        assert_eq!(hand.hand_number(), 1);
        assert_eq!(session.hand_number(), 1);
    }
}
