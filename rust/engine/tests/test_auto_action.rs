use std::sync::{Arc, Mutex};

use tablelog_engine::betting::{ActionKind, BettingAction, Street};
use tablelog_engine::cards::Card;
use tablelog_engine::errors::HandError;
use tablelog_engine::hand::CurrentHand;
use tablelog_engine::player::PlayerStatus;
use tablelog_engine::seats::{Position, TableSize};
use tablelog_engine::session::{Session, SessionConfig};
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

use Position::*;

fn six_max(hero: Option<Position>) -> CurrentHand {
    let mut config = SessionConfig::new(TableSize::Six, 5, 10).with_uniform_stacks(1_000);
    config.hero = hero;
    Session::new(config).unwrap().start_hand().unwrap()
}

/// Everyone limps, BB checks: six seats see the flop for 60.
fn limped_flop() -> CurrentHand {
    let mut hand = six_max(None);
    for seat in [Utg, Lojack, Cutoff, Button, SmallBlind] {
        hand.apply_action(BettingAction::call(seat)).unwrap();
    }
    hand.apply_action(BettingAction::check(BigBlind)).unwrap();
    let flop = ["Ah", "Kd", "7c"].map(|t| t.parse::<Card>().unwrap());
    hand.advance_to_flop(&flop).unwrap();
    hand
}

fn flop_actions(hand: &CurrentHand) -> Vec<(Position, ActionKind, bool)> {
    hand.round(Street::Flop)
        .unwrap()
        .actions()
        .iter()
        .map(|a| (a.position, a.kind, a.auto))
        .collect()
}

#[test]
fn skipped_seats_fold_when_a_bet_is_live() {
    let mut hand = limped_flop();
    for seat in [SmallBlind, BigBlind, Utg, Lojack, Cutoff] {
        hand.apply_action(BettingAction::check(seat)).unwrap();
    }
    hand.apply_action(BettingAction::raise(Button, 50)).unwrap();
    assert_eq!(hand.next_to_act(), Some(SmallBlind));

    hand.apply_action(BettingAction::call(Cutoff)).unwrap();

    for seat in [SmallBlind, BigBlind, Utg, Lojack] {
        assert_eq!(hand.player(seat).unwrap().status(), PlayerStatus::Folded);
    }
    let actions = flop_actions(&hand);
    assert_eq!(
        &actions[6..],
        &[
            (SmallBlind, ActionKind::Fold, true),
            (BigBlind, ActionKind::Fold, true),
            (Utg, ActionKind::Fold, true),
            (Lojack, ActionKind::Fold, true),
            (Cutoff, ActionKind::Call, false),
        ]
    );
    assert!(hand.can_advance_to_turn());
    assert_eq!(hand.pot(), 160);
}

#[test]
fn skipped_seats_check_when_nothing_is_bet() {
    let mut hand = limped_flop();
    hand.apply_action(BettingAction::check(Utg)).unwrap();

    assert_eq!(
        flop_actions(&hand),
        vec![
            (SmallBlind, ActionKind::Check, true),
            (BigBlind, ActionKind::Check, true),
            (Utg, ActionKind::Check, false),
        ]
    );
    assert!(hand.player(SmallBlind).unwrap().is_active());
    assert_eq!(hand.next_to_act(), Some(Lojack));
}

#[test]
fn failed_target_action_rolls_back_synthesized_actions() {
    let mut hand = limped_flop();
    hand.apply_action(BettingAction::raise(SmallBlind, 40)).unwrap();
    let before = hand.clone();

    // CO's raise to 60 is below the 80 minimum
    let err = hand
        .apply_action(BettingAction::raise(Cutoff, 60))
        .unwrap_err();
    assert_eq!(
        err,
        HandError::InvalidRaiseAmount {
            amount: 60,
            minimum: 80,
            maximum: 990
        }
    );
    assert_eq!(hand, before);
    assert_eq!(hand.next_to_act(), Some(BigBlind));
}

#[test]
fn seat_that_already_folded_cannot_act() {
    let mut hand = limped_flop();
    hand.apply_action(BettingAction::fold(SmallBlind)).unwrap();
    let err = hand
        .apply_action(BettingAction::check(SmallBlind))
        .unwrap_err();
    assert_eq!(
        err,
        HandError::OutOfTurnAction {
            expected: Some(BigBlind),
            actual: SmallBlind
        }
    );
}

#[test]
fn acting_before_first_seat_in_fresh_hand_is_rejected() {
    let mut hand = six_max(None);
    let before = hand.clone();
    let err = hand.apply_action(BettingAction::call(Button)).unwrap_err();
    assert_eq!(
        err,
        HandError::ActingBeforeFirstPosition {
            first: Utg,
            actual: Button
        }
    );
    assert_eq!(hand, before);
}

#[test]
fn button_opens_after_explicit_folds_to_it() {
    let mut hand = six_max(None);
    let err = hand
        .apply_action(BettingAction::raise(Button, 30))
        .unwrap_err();
    assert_eq!(
        err,
        HandError::ActingBeforeFirstPosition {
            first: Utg,
            actual: Button
        }
    );

    hand.apply_action(BettingAction::fold(Utg)).unwrap();
    hand.apply_action(BettingAction::raise(Button, 30)).unwrap();
    let preflop = hand.round(Street::Preflop).unwrap();
    let auto: Vec<_> = preflop.actions().iter().filter(|a| a.auto).map(|a| a.position).collect();
    assert_eq!(auto, vec![Lojack, Cutoff]);
    assert_eq!(hand.next_to_act(), Some(SmallBlind));
}

#[test]
fn hero_is_never_folded_automatically_preflop() {
    let mut hand = six_max(Some(Lojack));
    let err = hand
        .apply_action(BettingAction::raise(Cutoff, 30))
        .unwrap_err();
    assert_eq!(
        err,
        HandError::ActingBeforeFirstPosition {
            first: Lojack,
            actual: Cutoff
        }
    );
    assert_eq!(hand.next_to_act(), Some(Utg));

    // once the hero has acted, later skips are fine
    hand.apply_action(BettingAction::call(Lojack)).unwrap();
    hand.apply_action(BettingAction::raise(Button, 40)).unwrap();
    assert_eq!(hand.player(Utg).unwrap().status(), PlayerStatus::Folded);
    assert_eq!(hand.player(Cutoff).unwrap().status(), PlayerStatus::Folded);
    assert_eq!(hand.next_to_act(), Some(SmallBlind));
}

#[derive(Clone, Default)]
struct WarnCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        struct Visitor(String);
        impl tracing::field::Visit for Visitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                self.0.push_str(&format!("{}={:?} ", field.name(), value));
            }
        }
        let mut visitor = Visitor(String::new());
        event.record(&mut visitor);
        self.messages.lock().unwrap().push(visitor.0);
    }
}

#[test]
fn synthesized_actions_are_logged_as_warnings() {
    let capture = WarnCapture::default();
    let subscriber = Registry::default().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut hand = limped_flop();
        hand.apply_action(BettingAction::check(BigBlind)).unwrap();
    });

    let messages = capture.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("synthesized action for skipped seat"));
    assert!(messages[0].contains("position=SB"));
    assert!(messages[0].contains("kind=check"));
}
