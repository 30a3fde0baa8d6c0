use std::fs;

use serde_json::Value;
use serial_test::serial;
use tablelog_cli::run;

const VARS: &[&str] = &[
    "TABLELOG_CONFIG",
    "TABLELOG_TABLE_SIZE",
    "TABLELOG_SMALL_BLIND",
    "TABLELOG_BIG_BLIND",
    "TABLELOG_STARTING_STACK",
    "TABLELOG_HERO",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

fn set_env(key: &str, value: &str) {
    unsafe {
        std::env::set_var(key, value);
    }
}

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let mut argv = vec!["tablelog"];
    argv.extend_from_slice(args);
    let code = run(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
#[serial]
fn cfg_shows_defaults() {
    clear_env();
    let (code, out, _) = run_cli(&["cfg"]);
    assert_eq!(code, 0);
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["table_size"]["value"], 6);
    assert_eq!(json["table_size"]["source"], "default");
    assert_eq!(json["big_blind"]["value"], 10);
    assert_eq!(json["starting_stack"]["value"], 1000);
    assert!(json["hero"]["value"].is_null());
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tablelog.toml");
    fs::write(&file, "small_blind = 25\nbig_blind = 50\nhero = \"BB\"\n").unwrap();
    set_env("TABLELOG_CONFIG", file.to_str().unwrap());
    set_env("TABLELOG_BIG_BLIND", "100");

    let (code, out, err) = run_cli(&["cfg"]);
    clear_env();
    assert_eq!(code, 0, "stderr: {}", err);
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["small_blind"]["value"], 25);
    assert_eq!(json["small_blind"]["source"], "file");
    assert_eq!(json["big_blind"]["value"], 100);
    assert_eq!(json["big_blind"]["source"], "env");
    assert_eq!(json["hero"]["value"], "BB");
    assert_eq!(json["table_size"]["source"], "default");
}

#[test]
#[serial]
fn unsupported_table_size_is_rejected() {
    clear_env();
    set_env("TABLELOG_TABLE_SIZE", "7");
    let (code, out, err) = run_cli(&["cfg"]);
    clear_env();
    assert_eq!(code, 2);
    assert!(out.is_empty());
    assert!(err.starts_with("Error: Configuration error"), "{}", err);
}

#[test]
#[serial]
fn hero_seat_missing_from_table_is_rejected() {
    clear_env();
    set_env("TABLELOG_HERO", "HJ");
    let (code, _, err) = run_cli(&["cfg"]);
    clear_env();
    assert_eq!(code, 2);
    assert!(err.contains("Invalid configuration"), "{}", err);
}

#[test]
#[serial]
fn record_uses_configured_table() {
    clear_env();
    set_env("TABLELOG_HERO", "BTN");
    set_env("TABLELOG_SMALL_BLIND", "1");
    set_env("TABLELOG_BIG_BLIND", "2");
    set_env("TABLELOG_STARTING_STACK", "300");

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("short.hand");
    fs::write(&script, "hand\nCO raise 6\nBTN fold\nSB fold\nBB fold\n").unwrap();
    let (code, out, err) = run_cli(&["record", "--script", script.to_str().unwrap()]);
    clear_env();

    assert_eq!(code, 0, "stderr: {}", err);
    let hand: Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(hand["hero"], "BTN");
    assert_eq!(hand["blinds"]["big_blind"], 2);
    assert_eq!(hand["stacks_before"]["CO"], 300);
    assert_eq!(hand["result"]["outcome"], "folded");
    assert_eq!(hand["stacks_after"]["CO"], 303);
}

#[test]
#[serial]
fn script_header_overrides_config() {
    clear_env();
    set_env("TABLELOG_BIG_BLIND", "2");
    set_env("TABLELOG_SMALL_BLIND", "1");

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("header.hand");
    fs::write(
        &script,
        "blinds 50 100\nstack CO 5000\nhand\nCO raise 300\nBTN fold\nSB fold\nBB fold\n",
    )
    .unwrap();
    let (code, out, err) = run_cli(&["record", "--script", script.to_str().unwrap()]);
    clear_env();

    assert_eq!(code, 0, "stderr: {}", err);
    let hand: Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(hand["blinds"]["small_blind"], 50);
    assert_eq!(hand["stacks_before"]["CO"], 5000);
    assert_eq!(hand["stacks_before"]["BTN"], 1000);
    assert_eq!(hand["result"]["pot_won"], 450);
}
