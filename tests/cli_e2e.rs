//! End-to-end tests for the chatcode binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn chatcode() -> Command {
    Command::cargo_bin("chatcode").unwrap()
}

fn write_pairwise_log(path: &Path) {
    fs::write(
        path,
        r#"[
          {"ts": "2024-03-01T09:00:00", "from": "alice", "to": "bob", "body": "hi"},
          {"ts": "2024-03-01T09:01:00", "from": "bob", "to": "alice", "body": "hello"},
          {"ts": "2024-03-01T09:02:00", "from": "alice", "to": "bob", "body": "how are you"}
        ]"#,
    )
    .unwrap();
}

#[test]
fn clean_single_file_with_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dump.json");
    let output = dir.path().join("out.json");
    fs::write(
        &input,
        r#"[{"chat_id": "!room:server.org", "sender_alias": "@bob:server.org", "message": "hi"}]"#,
    )
    .unwrap();

    chatcode()
        .arg("clean")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-s")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned 1 messages"))
        .stdout(predicate::str::contains("Summary:"))
        .stdout(predicate::str::contains("!room: 1 messages"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"!room\""));
    assert!(written.contains("\"bob\""));
}

#[test]
fn clean_missing_input_fails() {
    chatcode()
        .arg("clean")
        .arg("/nonexistent/dump.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn clean_batch_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cleaned");
    fs::write(
        dir.path().join("good.json"),
        r#"[{"chat_id": "!a:s", "sender_alias": "@u:s"}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), "{nope").unwrap();

    chatcode()
        .arg("clean")
        .arg(dir.path())
        .arg("-b")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned 1 files"))
        .stderr(predicate::str::contains("Skipping"));

    assert!(out.join("cleaned_good.json").exists());
    assert!(!out.join("cleaned_broken.json").exists());
}

#[test]
fn convo_writes_requested_pages() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log.json");
    let aliases = dir.path().join("aliases.json");
    let out = dir.path().join("html");
    write_pairwise_log(&log);
    fs::write(&aliases, r#"[{"primary": "bob", "aliases": ["bobby"]}]"#).unwrap();

    chatcode()
        .arg("convo")
        .arg("--files")
        .arg(&log)
        .arg("--aliases")
        .arg(&aliases)
        .arg("--users")
        .arg("alice,bob")
        .arg("alice,nobody")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total processed message count: 3"))
        .stderr(predicate::str::contains(
            "No conversation found between alice and nobody.",
        ));

    let page = fs::read_to_string(out.join("conversation_history_alice_bob.html")).unwrap();
    assert!(page.contains("Conversation: alice &amp; bob"));
    assert!(page.contains("Turn 1 (alice)"));
    assert!(page.contains("downloadCSVButton"));
}

#[test]
fn convo_continues_past_missing_alias_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log.json");
    write_pairwise_log(&log);

    chatcode()
        .arg("convo")
        .arg("--files")
        .arg(&log)
        .arg("--aliases")
        .arg(dir.path().join("missing_aliases.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total processed message count: 3"))
        .stderr(predicate::str::contains("Failed to load alias mapping"));
}

#[test]
fn group_picks_most_active_user() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("group.json");
    let out = dir.path().join("html");
    fs::write(
        &log,
        r#"[
          {"timestamp": "2024-03-01T09:00:00Z", "chat_id": "!work", "sender_alias": "alice", "message": "one"},
          {"timestamp": "2024-03-01T09:01:00Z", "chat_id": "!work", "sender_alias": "bob", "message": "two"},
          {"timestamp": "2024-03-01T09:02:00Z", "chat_id": "!work", "sender_alias": "alice", "message": "three"}
        ]"#,
    )
    .unwrap();

    chatcode()
        .arg("group")
        .arg(&log)
        .arg("--chat-id")
        .arg("!work")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Using 'alice' as the main user (messages shown on right)",
        ));

    let page = fs::read_to_string(out.join("group_chat_work.html")).unwrap();
    assert!(page.contains("Group Chat: !work"));
    assert!(page.contains("Main user (messages on right): <strong>alice</strong>"));
}

#[test]
fn group_reports_unknown_chat_id() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("group.json");
    fs::write(
        &log,
        r#"[{"timestamp": "2024-03-01T09:00:00Z", "chat_id": "!work", "sender_alias": "a", "message": "x"}]"#,
    )
    .unwrap();

    chatcode()
        .arg("group")
        .arg(&log)
        .arg("--chat-id")
        .arg("!nope")
        .assert()
        .success()
        .stdout(predicate::str::contains("No messages found for chat_id: !nope"));
}

#[test]
fn help_lists_subcommands() {
    chatcode()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("convo"))
        .stdout(predicate::str::contains("group"));
}
