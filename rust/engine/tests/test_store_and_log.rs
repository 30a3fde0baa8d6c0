use std::fs;
use std::io::BufReader;

use tablelog_engine::betting::BettingAction;
use tablelog_engine::hand::CurrentHand;
use tablelog_engine::logger::{read_hands, HandLogger, StoredHand};
use tablelog_engine::seats::{Position, TableSize};
use tablelog_engine::session::{Session, SessionConfig};
use tablelog_engine::store::{HandStore, MemoryStore, SessionId, StoreError};

fn session() -> Session {
    Session::new(
        SessionConfig::new(TableSize::Six, 1, 2)
            .with_uniform_stacks(200)
            .with_hero(Position::Button),
    )
    .unwrap()
}

fn walk(session: &mut Session) -> (CurrentHand, StoredHand) {
    let mut hand = session.start_hand().unwrap();
    hand.apply_action(BettingAction::raise(Position::Cutoff, 6))
        .unwrap();
    hand.apply_action(BettingAction::fold(Position::Button))
        .unwrap();
    hand.apply_action(BettingAction::fold(Position::SmallBlind))
        .unwrap();
    hand.apply_action(BettingAction::fold(Position::BigBlind))
        .unwrap();
    let stored = session.record(&mut hand).unwrap();
    (hand, stored)
}

#[test]
fn writes_jsonl_with_lf_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hands.jsonl");
    let mut s = session();
    let mut logger = HandLogger::create(&path).expect("create logger");
    let (_, first) = walk(&mut s);
    let (_, second) = walk(&mut s);
    logger.write(&first).unwrap();
    logger.write(&second).unwrap();
    assert_eq!(logger.written(), 2);

    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));

    let hands = read_hands(BufReader::new(fs::File::open(&path).unwrap())).unwrap();
    assert_eq!(hands, vec![first, second]);
    assert!(hands[1].hand_id.ends_with("-000002"));
}

#[test]
fn stored_hand_json_uses_seat_labels() {
    let mut s = session();
    let (_, stored) = walk(&mut s);
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["hero"], "BTN");
    assert_eq!(json["table_size"], 6);
    assert_eq!(json["result"]["outcome"], "folded");
    assert_eq!(json["result"]["winners"][0], "CO");
    assert_eq!(json["rounds"][0]["actions"][0]["kind"], "small-blind");
    // UTG and LJ were skipped
    assert_eq!(json["rounds"][0]["actions"][2]["auto"], true);
}

#[test]
fn memory_store_keeps_hands_per_session() {
    let store = MemoryStore::new();
    let table_one = SessionId::new("table-1");
    let table_two = SessionId::new("table-2");
    let mut s = session();

    let open = s.start_hand().unwrap();
    store.save_open_hand(&table_one, &open).unwrap();
    assert_eq!(store.load_open_hand(&table_one).unwrap(), Some(open));
    assert_eq!(store.load_open_hand(&table_two).unwrap(), None);

    let (finished, stored) = walk(&mut s);
    store.save_hand(&table_one, stored.clone()).unwrap();
    assert_eq!(store.load_open_hand(&table_one).unwrap(), None);
    assert_eq!(store.list_hands(&table_one).unwrap(), vec![stored.clone()]);
    assert!(store.list_hands(&table_two).unwrap().is_empty());

    assert_eq!(
        store.save_hand(&table_one, stored.clone()),
        Err(StoreError::Duplicate(stored.hand_id.clone()))
    );
    assert_eq!(
        store.save_open_hand(&table_one, &finished),
        Err(StoreError::AlreadyFinalized(finished.hand_number()))
    );
}

#[test]
fn open_hand_survives_a_json_round_trip() {
    let mut s = session();
    let mut hand = s.start_hand().unwrap();
    hand.apply_action(BettingAction::call(Position::Utg)).unwrap();
    let json = serde_json::to_string(&hand).unwrap();
    let mut restored: CurrentHand = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, hand);

    restored
        .apply_action(BettingAction::call(Position::Lojack))
        .unwrap();
    assert_eq!(restored.next_to_act(), Some(Position::Cutoff));
}
