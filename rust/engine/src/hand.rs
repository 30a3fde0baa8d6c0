//! The live hand: street sequencing, board prerequisites, early termination
//! and payout.
//!
//! [`CurrentHand`] is the only owner of the hand's players and rounds. Callers
//! drive it through its methods and read it through accessors; no field is
//! reachable from outside the engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auto_action::apply_with_auto_actions;
use crate::betting::{ActionKind, BettingAction, BettingRound, Street};
use crate::cards::{ensure_distinct, Card};
use crate::errors::HandError;
use crate::logger::{format_hand_id, HandResult, Outcome, StoredHand};
use crate::player::{PlayerState, PlayerStatus};
use crate::seats::{rotation_from, Position, TableSize};
use crate::session::{ensure_chip_total, SessionConfig};

/// Where the hand is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Finished,
}

impl Stage {
    /// The betting street for this stage, if betting happens in it.
    pub fn street(self) -> Option<Street> {
        match self {
            Stage::Preflop => Some(Street::Preflop),
            Stage::Flop => Some(Street::Flop),
            Stage::Turn => Some(Street::Turn),
            Stage::River => Some(Street::River),
            Stage::Showdown | Stage::Finished => None,
        }
    }
}

impl From<Street> for Stage {
    fn from(street: Street) -> Self {
        match street {
            Street::Preflop => Stage::Preflop,
            Street::Flop => Stage::Flop,
            Street::Turn => Stage::Turn,
            Street::River => Stage::River,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Blinds {
    pub small_blind: u32,
    pub big_blind: u32,
}

impl Blinds {
    pub fn new(small_blind: u32, big_blind: u32) -> Self {
        Self {
            small_blind,
            big_blind,
        }
    }
}

/// Board cards, filled strictly in order: flop, then turn, then river.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CommunityCards {
    flop: Option<[Card; 3]>,
    turn: Option<Card>,
    river: Option<Card>,
}

impl CommunityCards {
    pub fn flop(&self) -> Option<&[Card; 3]> {
        self.flop.as_ref()
    }
    pub fn turn(&self) -> Option<&Card> {
        self.turn.as_ref()
    }
    pub fn river(&self) -> Option<&Card> {
        self.river.as_ref()
    }

    /// Every dealt card in board order.
    pub fn board(&self) -> Vec<Card> {
        self.flop
            .iter()
            .flatten()
            .chain(self.turn.iter())
            .chain(self.river.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flop.as_ref().map_or(0, |f| f.len())
            + usize::from(self.turn.is_some())
            + usize::from(self.river.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a showdown was decided. Hand ranking happens outside the engine.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Winner(Position),
    Chop(Vec<Position>),
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CurrentHand {
    hand_number: u32,
    table_size: TableSize,
    blinds: Blinds,
    hero: Option<Position>,
    hole_cards: Option<[Card; 2]>,
    community: CommunityCards,
    stage: Stage,
    rounds: BTreeMap<Street, BettingRound>,
    players: Vec<PlayerState>,
    pot: u32,
    next_to_act: Option<Position>,
    can_advance_to_flop: bool,
    can_advance_to_turn: bool,
    can_advance_to_river: bool,
    payouts: BTreeMap<Position, u32>,
    finalized: bool,
    started_at: DateTime<Utc>,
}

impl CurrentHand {
    /// Seats every position with chips in `stacks`, posts the blinds and
    /// opens preflop betting.
    pub fn start(
        config: &SessionConfig,
        hand_number: u32,
        stacks: &BTreeMap<Position, u32>,
    ) -> Result<Self, HandError> {
        config.validate()?;
        ensure_chip_total(stacks)?;
        let table_size = config.table_size;
        let mut players: Vec<PlayerState> = table_size
            .seats()
            .iter()
            .filter_map(|p| match stacks.get(p) {
                Some(&s) if s > 0 => Some(PlayerState::new(*p, s)),
                _ => None,
            })
            .collect();
        if players.len() < 2 {
            return Err(HandError::InvalidConfig(
                "a hand needs at least two seats with chips".into(),
            ));
        }

        let mut round = BettingRound::open(
            table_size,
            Street::Preflop,
            0,
            &mut players,
            Position::BigBlind,
        );
        let blinds = config.blinds;
        for (seat, kind, amount) in [
            (Position::SmallBlind, ActionKind::SmallBlind, blinds.small_blind),
            (Position::BigBlind, ActionKind::BigBlind, blinds.big_blind),
        ] {
            if amount > 0 && players.iter().any(|p| p.position() == seat) {
                round.post_forced(&mut players, seat, kind, amount)?;
            }
        }

        let mut hand = Self {
            hand_number,
            table_size,
            blinds,
            hero: config.hero,
            hole_cards: None,
            community: CommunityCards::default(),
            stage: Stage::Preflop,
            rounds: BTreeMap::from([(Street::Preflop, round)]),
            players,
            pot: 0,
            next_to_act: None,
            can_advance_to_flop: false,
            can_advance_to_turn: false,
            can_advance_to_river: false,
            payouts: BTreeMap::new(),
            finalized: false,
            started_at: Utc::now(),
        };
        hand.refresh();
        info!(
            hand_number,
            table = %table_size,
            seats = hand.players.len(),
            pot = hand.pot,
            "hand started"
        );
        Ok(hand)
    }

    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }
    pub fn table_size(&self) -> TableSize {
        self.table_size
    }
    pub fn blinds(&self) -> Blinds {
        self.blinds
    }
    pub fn hero(&self) -> Option<Position> {
        self.hero
    }
    pub fn hole_cards(&self) -> Option<&[Card; 2]> {
        self.hole_cards.as_ref()
    }
    pub fn community(&self) -> &CommunityCards {
        &self.community
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }
    pub fn player(&self, position: Position) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.position() == position)
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn next_to_act(&self) -> Option<Position> {
        self.next_to_act
    }
    pub fn can_advance_to_flop(&self) -> bool {
        self.can_advance_to_flop
    }
    pub fn can_advance_to_turn(&self) -> bool {
        self.can_advance_to_turn
    }
    pub fn can_advance_to_river(&self) -> bool {
        self.can_advance_to_river
    }
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The betting street in progress, if any.
    pub fn current_street(&self) -> Option<Street> {
        self.stage.street()
    }

    pub fn round(&self, street: Street) -> Option<&BettingRound> {
        self.rounds.get(&street)
    }

    /// Rounds reached so far, in street order.
    pub fn rounds(&self) -> impl Iterator<Item = &BettingRound> {
        self.rounds.values()
    }

    /// Seats still contesting the pot.
    pub fn contenders(&self) -> Vec<Position> {
        self.players
            .iter()
            .filter(|p| p.is_in_hand())
            .map(|p| p.position())
            .collect()
    }

    /// Chips each seat won. Empty until the hand is finished.
    pub fn payouts(&self) -> &BTreeMap<Position, u32> {
        &self.payouts
    }

    /// Current stack of every seat dealt into this hand.
    pub fn stacks_after(&self) -> BTreeMap<Position, u32> {
        self.players
            .iter()
            .map(|p| (p.position(), p.stack()))
            .collect()
    }

    pub fn set_hole_cards(&mut self, cards: [Card; 2]) -> Result<&Self, HandError> {
        self.ensure_open()?;
        let board = self.community.board();
        ensure_distinct(cards.iter().chain(board.iter()))?;
        self.hole_cards = Some(cards);
        Ok(self)
    }

    /// Posts the optional straddle for the seat directly after the big blind.
    pub fn post_straddle(&mut self, amount: u32) -> Result<&Self, HandError> {
        self.ensure_open()?;
        let seat = self.straddle_seat()?;
        let minimum = self.blinds.big_blind.saturating_mul(2);
        let player = self
            .player(seat)
            .ok_or_else(|| HandError::StraddleUnavailable(format!("{} is not seated", seat)))?;
        let maximum = player.max_commitment();
        if amount < minimum || amount > maximum {
            return Err(HandError::InvalidRaiseAmount {
                amount,
                minimum,
                maximum,
            });
        }
        let round = self
            .rounds
            .get_mut(&Street::Preflop)
            .ok_or_else(|| HandError::StraddleUnavailable("preflop round missing".into()))?;
        round.post_forced(&mut self.players, seat, ActionKind::Straddle, amount)?;
        info!(position = %seat, amount, "straddle posted");
        self.refresh();
        Ok(self)
    }

    fn straddle_seat(&self) -> Result<Position, HandError> {
        let unavailable = |why: &str| Err(HandError::StraddleUnavailable(why.to_string()));
        if self.stage != Stage::Preflop {
            return unavailable("only preflop");
        }
        let Some(round) = self.rounds.get(&Street::Preflop) else {
            return unavailable("preflop round missing");
        };
        if !round.only_forced_actions() {
            return unavailable("voluntary action already recorded");
        }
        if round
            .actions()
            .iter()
            .any(|a| a.kind == ActionKind::Straddle)
        {
            return unavailable("only one straddle per hand");
        }
        match rotation_from(self.table_size, Position::BigBlind).next() {
            Some(seat) if seat != Position::Button => Ok(seat),
            _ => unavailable("no seat after the big blind"),
        }
    }

    /// Records one action. Seats skipped by an out-of-order submission get
    /// synthesized folds or checks first; see [`apply_with_auto_actions`]
    /// for why BTN and the blinds cannot open a fresh hand that way.
    pub fn apply_action(&mut self, action: BettingAction) -> Result<&Self, HandError> {
        self.ensure_open()?;
        let hero = self.hero;
        let Some(street) = self.stage.street() else {
            return Err(HandError::OutOfTurnAction {
                expected: None,
                actual: action.position,
            });
        };
        let round = self
            .rounds
            .get_mut(&street)
            .ok_or_else(|| HandError::PrematureAdvance(format!("{} not opened", street)))?;
        apply_with_auto_actions(round, &mut self.players, action, hero)?;
        self.pot = round.pot();

        let contenders = self.contenders();
        if let [winner] = contenders[..] {
            self.finish_single_survivor(winner);
        }
        self.refresh();
        Ok(self)
    }

    pub fn advance_to_flop(&mut self, cards: &[Card]) -> Result<&Self, HandError> {
        self.ensure_open()?;
        self.ensure_round_closed(Stage::Preflop)?;
        let [a, b, c] = cards else {
            return Err(HandError::PrematureAdvance(format!(
                "flop needs exactly 3 cards, got {}",
                cards.len()
            )));
        };
        self.check_new_cards(cards)?;
        self.community.flop = Some([a.clone(), b.clone(), c.clone()]);
        self.open_street(Street::Flop);
        Ok(self)
    }

    pub fn advance_to_turn(&mut self, card: Card) -> Result<&Self, HandError> {
        self.ensure_open()?;
        self.ensure_round_closed(Stage::Flop)?;
        self.check_new_cards(std::slice::from_ref(&card))?;
        self.community.turn = Some(card);
        self.open_street(Street::Turn);
        Ok(self)
    }

    pub fn advance_to_river(&mut self, card: Card) -> Result<&Self, HandError> {
        self.ensure_open()?;
        self.ensure_round_closed(Stage::Turn)?;
        self.check_new_cards(std::slice::from_ref(&card))?;
        self.community.river = Some(card);
        self.open_street(Street::River);
        Ok(self)
    }

    pub fn advance_to_showdown(&mut self) -> Result<&Self, HandError> {
        self.ensure_open()?;
        self.ensure_round_closed(Stage::River)?;
        if self.contenders().len() < 2 {
            return Err(HandError::PrematureAdvance(
                "showdown needs at least two seats in the hand".into(),
            ));
        }
        self.stage = Stage::Showdown;
        info!(
            hand_number = self.hand_number,
            pot = self.pot,
            contenders = self.contenders().len(),
            "showdown reached"
        );
        self.refresh();
        Ok(self)
    }

    /// Pays the pot according to the externally decided showdown result.
    ///
    /// A chop splits the pot evenly; leftover chips go one each to the
    /// co-winners in rotation order starting after the button.
    pub fn resolve_showdown(&mut self, resolution: Resolution) -> Result<&Self, HandError> {
        self.ensure_open()?;
        if self.stage != Stage::Showdown {
            return Err(HandError::PrematureAdvance(
                "showdown has not been reached".into(),
            ));
        }
        let mut winners = match resolution {
            Resolution::Winner(p) => vec![p],
            Resolution::Chop(ps) => ps,
        };
        winners.sort();
        winners.dedup();
        let contenders = self.contenders();
        if winners.is_empty() {
            return Err(HandError::PrematureAdvance("no winner supplied".into()));
        }
        if let Some(bad) = winners.iter().find(|w| !contenders.contains(w)) {
            return Err(HandError::InvalidWinner(*bad));
        }

        let shares = split_pot(self.pot, &winners, self.table_size);
        self.pay(&shares);
        self.stage = Stage::Finished;
        info!(
            hand_number = self.hand_number,
            pot = self.pot,
            winners = ?winners,
            "hand finished at showdown"
        );
        self.refresh();
        Ok(self)
    }

    /// Produces the immutable record of a finished hand. Succeeds once.
    pub fn finalize(&mut self) -> Result<StoredHand, HandError> {
        if self.finalized {
            return Err(HandError::HandAlreadyFinished);
        }
        if self.stage != Stage::Finished {
            return Err(HandError::PrematureAdvance(format!(
                "hand is still at {:?}",
                self.stage
            )));
        }
        self.finalized = true;
        let winners: Vec<Position> = self.payouts.keys().copied().collect();
        let hero_state = self.hero.and_then(|h| self.player(h));
        let outcome = hero_state.map(|p| {
            if p.status() == PlayerStatus::Folded {
                Outcome::Folded
            } else if !winners.contains(&p.position()) {
                Outcome::Lost
            } else if winners.len() > 1 {
                Outcome::Chopped
            } else {
                Outcome::Won
            }
        });

        let record = StoredHand {
            hand_id: format_hand_id(
                &self.started_at.format("%Y%m%d").to_string(),
                self.hand_number,
            ),
            hand_number: self.hand_number,
            timestamp: self.started_at,
            table_size: self.table_size,
            blinds: self.blinds,
            hero: self.hero,
            hole_cards: self.hole_cards.clone(),
            board: self.community.board(),
            rounds: self.rounds.values().cloned().collect(),
            stacks_before: self
                .players
                .iter()
                .map(|p| (p.position(), p.starting_stack()))
                .collect(),
            stacks_after: self.stacks_after(),
            result: HandResult {
                winners,
                pot_won: self.pot,
                payouts: self.payouts.clone(),
                stack_after: hero_state.map(|p| p.stack()),
                outcome,
            },
        };
        info!(hand_id = %record.hand_id, pot = self.pot, "hand finalized");
        Ok(record)
    }

    fn ensure_open(&self) -> Result<(), HandError> {
        if self.stage == Stage::Finished {
            Err(HandError::HandAlreadyFinished)
        } else {
            Ok(())
        }
    }

    fn ensure_round_closed(&self, stage: Stage) -> Result<(), HandError> {
        if self.stage != stage {
            return Err(HandError::PrematureAdvance(format!(
                "hand is at {:?}, not {:?}",
                self.stage, stage
            )));
        }
        let closed = stage
            .street()
            .and_then(|s| self.rounds.get(&s))
            .is_some_and(|r| r.is_complete());
        if closed {
            Ok(())
        } else {
            Err(HandError::PrematureAdvance(format!(
                "{:?} betting is still open",
                stage
            )))
        }
    }

    fn check_new_cards(&self, new: &[Card]) -> Result<(), HandError> {
        let board = self.community.board();
        ensure_distinct(
            self.hole_cards
                .iter()
                .flatten()
                .chain(board.iter())
                .chain(new.iter()),
        )
    }

    fn open_street(&mut self, street: Street) {
        let round = BettingRound::open(
            self.table_size,
            street,
            self.pot,
            &mut self.players,
            Position::Button,
        );
        self.rounds.insert(street, round);
        self.stage = street.into();
        info!(
            hand_number = self.hand_number,
            street = %street,
            pot = self.pot,
            board = self.community.len(),
            "street opened"
        );
        self.refresh();
    }

    fn finish_single_survivor(&mut self, winner: Position) {
        self.pay(&[(winner, self.pot)]);
        self.stage = Stage::Finished;
        info!(
            hand_number = self.hand_number,
            winner = %winner,
            pot = self.pot,
            "hand finished, everyone else folded"
        );
    }

    fn pay(&mut self, shares: &[(Position, u32)]) {
        for (seat, amount) in shares {
            if let Some(p) = self.players.iter_mut().find(|p| p.position() == *seat) {
                p.award(*amount);
            }
            *self.payouts.entry(*seat).or_insert(0) += amount;
        }
    }

    /// Recomputes the derived fields after every mutation.
    fn refresh(&mut self) {
        let closed = |s: Street| self.rounds.get(&s).is_some_and(|r| r.is_complete());
        self.can_advance_to_flop =
            self.stage == Stage::Preflop && closed(Street::Preflop) && self.community.flop.is_none();
        self.can_advance_to_turn =
            self.stage == Stage::Flop && closed(Street::Flop) && self.community.turn.is_none();
        self.can_advance_to_river =
            self.stage == Stage::Turn && closed(Street::Turn) && self.community.river.is_none();
        self.next_to_act = self
            .stage
            .street()
            .and_then(|s| self.rounds.get(&s))
            .and_then(|r| r.next_to_act());
        if let Some(round) = self.stage.street().and_then(|s| self.rounds.get(&s)) {
            self.pot = round.pot();
        }
    }
}

/// Even split with leftover chips handed out in rotation order after the
/// button.
pub fn split_pot(pot: u32, winners: &[Position], table: TableSize) -> Vec<(Position, u32)> {
    let ordered: Vec<Position> = rotation_from(table, Position::Button)
        .filter(|p| winners.contains(p))
        .collect();
    if ordered.is_empty() {
        return Vec::new();
    }
    let n = ordered.len() as u32;
    let share = pot / n;
    let remainder = (pot % n) as usize;
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, p)| (p, share + u32::from(i < remainder)))
        .collect()
}
