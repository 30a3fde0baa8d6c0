//! # tablelog-engine: Hand Recorder Core
//!
//! State machine for recording live No-Limit Hold'em hands at 6-max and 9-max
//! tables. The engine validates every action against the betting rules,
//! tracks whose turn it is, moves the hand from street to street and pays out
//! the pot. It never deals cards or ranks hands: board cards and showdown
//! winners are supplied by the operator.
//!
//! ## Core Modules
//!
//! - [`seats`] - Positions, table sizes and clockwise rotation
//! - [`player`] - Per-seat stack and commitment state
//! - [`rules`] - Legality checks for a single action
//! - [`betting`] - Betting rounds and the strict single-action engine
//! - [`auto_action`] - Default folds/checks for seats skipped by the operator
//! - [`hand`] - The live hand: streets, board, early termination, payout
//! - [`session`] - Table configuration and stack carry between hands
//! - [`logger`] - Finished-hand records and the JSONL hand log
//! - [`store`] - Persistence contract for finished and in-progress hands
//! - [`cards`] - Opaque card tokens
//! - [`errors`] - Error types for hand operations
//!
//! ## Quick Start
//!
//! ```rust
//! use tablelog_engine::betting::BettingAction;
//! use tablelog_engine::hand::Stage;
//! use tablelog_engine::seats::{Position, TableSize};
//! use tablelog_engine::session::{Session, SessionConfig};
//!
//! let config = SessionConfig::new(TableSize::Six, 5, 10).with_uniform_stacks(1_000);
//! let mut session = Session::new(config).unwrap();
//! let mut hand = session.start_hand().unwrap();
//! assert_eq!(hand.pot(), 15);
//! assert_eq!(hand.next_to_act(), Some(Position::Utg));
//!
//! // CO opens; UTG and LJ were skipped and fold automatically.
//! hand.apply_action(BettingAction::raise(Position::Cutoff, 30)).unwrap();
//! for seat in [Position::Button, Position::SmallBlind, Position::BigBlind] {
//!     hand.apply_action(BettingAction::fold(seat)).unwrap();
//! }
//! assert_eq!(hand.stage(), Stage::Finished);
//!
//! let stored = session.record(&mut hand).unwrap();
//! assert_eq!(stored.result.winners, vec![Position::Cutoff]);
//! assert_eq!(stored.result.pot_won, 45);
//! ```

pub mod auto_action;
pub mod betting;
pub mod cards;
pub mod errors;
pub mod hand;
pub mod logger;
pub mod player;
pub mod rules;
pub mod seats;
pub mod session;
pub mod store;
