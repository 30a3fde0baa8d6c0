use serde::{Deserialize, Serialize};

use crate::seats::Position;

/// Whether a seat can still act in this hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStatus {
    /// Still in the hand with chips behind
    Active,
    /// Gave up the hand
    Folded,
    /// Every chip is committed; stays in the hand but never acts again
    AllIn,
}

/// Per-seat state for one hand. Only the betting engine mutates it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    position: Position,
    status: PlayerStatus,
    /// Chips behind
    stack: u32,
    /// Chips committed in the current betting round
    current_bet: u32,
    has_acted: bool,
    /// Chips committed across every round of this hand
    total_committed: u32,
    starting_stack: u32,
}

impl PlayerState {
    pub fn new(position: Position, stack: u32) -> Self {
        Self {
            position,
            status: PlayerStatus::Active,
            stack,
            current_bet: 0,
            has_acted: false,
            total_committed: 0,
            starting_stack: stack,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }
    pub fn status(&self) -> PlayerStatus {
        self.status
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn has_acted(&self) -> bool {
        self.has_acted
    }
    pub fn total_committed(&self) -> u32 {
        self.total_committed
    }
    pub fn starting_stack(&self) -> u32 {
        self.starting_stack
    }

    /// Active: neither folded nor all-in.
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    /// Still contesting the pot (active or all-in).
    pub fn is_in_hand(&self) -> bool {
        self.status != PlayerStatus::Folded
    }

    /// Most this seat can have committed in the current round.
    pub fn max_commitment(&self) -> u32 {
        self.stack.saturating_add(self.current_bet)
    }

    pub fn to_call(&self, round_bet: u32) -> u32 {
        round_bet.saturating_sub(self.current_bet)
    }

    /// Raises this round's commitment to `total`, clipped to the stack.
    /// Returns the chips actually moved. An emptied stack means all-in.
    pub(crate) fn commit_to(&mut self, total: u32) -> u32 {
        let delta = total.saturating_sub(self.current_bet).min(self.stack);
        self.stack -= delta;
        self.current_bet += delta;
        self.total_committed += delta;
        if self.stack == 0 && self.status == PlayerStatus::Active {
            self.status = PlayerStatus::AllIn;
        }
        delta
    }

    pub(crate) fn fold(&mut self) {
        self.status = PlayerStatus::Folded;
    }

    pub(crate) fn set_acted(&mut self, acted: bool) {
        self.has_acted = acted;
    }

    pub(crate) fn reset_for_street(&mut self) {
        self.current_bet = 0;
        self.has_acted = false;
    }

    pub(crate) fn award(&mut self, amount: u32) {
        self.stack = self.stack.saturating_add(amount);
    }
}
