//! Tests for ConsoleOperator helpers and prompting

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use crate::services::console::{ConsoleOperator, COMMAND_PROMPT};
use crate::traits::Operator;
use crate::types::{Candidate, CandidateList};

fn candidates() -> CandidateList {
    CandidateList::new(
        ["public-vpn-201", "vpn482915183"]
            .iter()
            .map(|id| Candidate {
                identifier: id.to_string(),
                country_long: "Japan".to_string(),
                country_short: "JP".to_string(),
                address: "10.0.0.1".to_string(),
                config_payload: Vec::new(),
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_menu_entry_layout() {
    let entry = ConsoleOperator::menu_entry(3, 12, "public-vpn-201", "Japan", "JP");

    assert_eq!(entry, " 3/12 public-vpn-201   (Japan  -JP)");
}

#[test]
fn test_answer_by_number() {
    assert_eq!(ConsoleOperator::resolve_answer(" 2 ", &candidates()), "vpn482915183");
}

#[test]
fn test_answer_out_of_range_or_text_passes_through() {
    let list = candidates();

    assert_eq!(ConsoleOperator::resolve_answer("0", &list), "0");
    assert_eq!(ConsoleOperator::resolve_answer("9", &list), "9");
    assert_eq!(ConsoleOperator::resolve_answer("public", &list), "public");
}

#[tokio::test]
async fn test_prompt_shown_once_per_command() {
    let (mut keyboard, input) = tokio::io::duplex(64);
    let (output, mut screen) = tokio::io::duplex(64);
    let mut operator = ConsoleOperator::from_io(BufReader::new(input), output);

    // Reads abandoned before a line arrives must not repeat the prompt
    for _ in 0..3 {
        let pending = tokio::time::timeout(Duration::from_millis(20), operator.read_command()).await;
        assert!(pending.is_err());
    }

    keyboard.write_all(b"status\n").await.unwrap();
    let command = operator.read_command().await.unwrap();
    assert_eq!(command.as_deref(), Some("status"));

    keyboard.write_all(b"exit\n").await.unwrap();
    let command = operator.read_command().await.unwrap();
    assert_eq!(command.as_deref(), Some("exit"));

    drop(operator);
    let mut shown = String::new();
    screen.read_to_string(&mut shown).await.unwrap();
    assert_eq!(shown, COMMAND_PROMPT.repeat(2));
}

#[tokio::test]
async fn test_menu_choice_read_from_input() {
    let (mut keyboard, input) = tokio::io::duplex(64);
    let (output, mut screen) = tokio::io::duplex(1024);
    let mut operator = ConsoleOperator::from_io(BufReader::new(input), output);

    keyboard.write_all(b"2\n").await.unwrap();
    let choice = operator.choose_server(&candidates()).await.unwrap();
    assert_eq!(choice, "vpn482915183");

    drop(operator);
    let mut shown = String::new();
    screen.read_to_string(&mut shown).await.unwrap();
    assert!(shown.contains(" 1/2  public-vpn-201"));
    assert!(shown.ends_with("Choose a server (number or hostname): "));
}
