#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

const HEADER: &str =
    "id,name,role,department,senior,unavailable_dates,unavailable_weekdays,preferred_days\n";

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roulement-cli").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn generate_check_commit_flow() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("staff.csv"),
        format!("{HEADER}1,Kanda,RN,ER,yes,,,\n2,Somchai,PN,ER,,,,\n3,Malee,RN,OPD,,,,\n"),
    )
    .unwrap();

    cli(dir.path())
        .args(["import-staff", "--csv", "staff.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 3 staff member(s)"));

    cli(dir.path())
        .args(["generate", "--month", "2024-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2024-06: 90 shift(s) assigned, 0 unfilled slot(s), 0 conflict(s)",
        ));

    cli(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    cli(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("1            | MMMMMMMMMM"));

    cli(dir.path())
        .arg("commit")
        .assert()
        .success()
        .stdout(predicate::str::contains("committed 2024-06"));

    cli(dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06"));

    cli(dir.path())
        .args(["history", "--month", "2024-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 720h, 0 conflict(s)"));
}

#[test]
fn manual_edit_on_blocked_day_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("staff.csv"),
        format!("{HEADER}1,Kanda,RN,ER,,,0,\n2,Somchai,PN,ER,,,,\n3,Malee,RN,OPD,,,,\n"),
    )
    .unwrap();
    cli(dir.path())
        .args(["import-staff", "--csv", "staff.csv"])
        .assert()
        .success();
    cli(dir.path())
        .args(["generate", "--month", "2024-06"])
        .assert()
        .success();

    // 2 juin 2024 : dimanche, Kanda ne travaille jamais le dimanche
    cli(dir.path())
        .args(["set", "--staff-id", "1", "--date", "2024-06-02", "--kind", "night"])
        .assert()
        .success();

    cli(dir.path())
        .args(["check", "--report", "conflicts.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("1 conflict(s)"));

    let report = std::fs::read_to_string(dir.path().join("conflicts.csv")).unwrap();
    assert!(report.contains("1,2024-06-02,NIGHT,weekday_blackout"));
}

#[test]
fn rejected_external_response_keeps_draft() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("staff.csv"),
        format!("{HEADER}1,Kanda,RN,ER,,,,\n"),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("response.json"),
        r#"{"staffAssignments":[{"staffId":"99","days":[{"date":"2024-06-01","type":"MORNING"}]}]}"#,
    )
    .unwrap();

    cli(dir.path())
        .args(["import-staff", "--csv", "staff.csv"])
        .assert()
        .success();
    cli(dir.path())
        .args(["generate", "--month", "2024-06", "--response", "response.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown staff: 99"));
}

#[test]
fn remap_to_invalid_date_fails() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("staff.csv"), format!("{HEADER}1,Kanda,RN,ER,,,,\n")).unwrap();
    cli(dir.path())
        .args(["import-staff", "--csv", "staff.csv"])
        .assert()
        .success();
    cli(dir.path())
        .args(["generate", "--month", "2024-06"])
        .assert()
        .success();

    cli(dir.path())
        .args(["remap", "--index", "0", "--to", "2024-06-31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid calendar remap target"));

    cli(dir.path())
        .args(["remap", "--index", "0", "--to", "2024-06-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("remap collision"));
}

#[test]
fn corrupt_draft_is_reported_not_replaced() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("staff.csv"), format!("{HEADER}1,Kanda,RN,ER,,,,\n")).unwrap();
    cli(dir.path())
        .args(["import-staff", "--csv", "staff.csv"])
        .assert()
        .success();
    std::fs::write(dir.path().join("draft.json"), "{ not json").unwrap();

    cli(dir.path())
        .args(["generate", "--month", "2024-06"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading draft draft.json"));

    let draft = std::fs::read_to_string(dir.path().join("draft.json")).unwrap();
    assert_eq!(draft, "{ not json");
}
