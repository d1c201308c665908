mod common;
use common::{SCENARIO_LOG, TestProject};
use predicates::prelude::*;
use std::fs;

#[test]
fn log_without_data_section_fails() {
    let p = TestProject::new("[Header]\nSite=Ganaraska\n");
    p.cmd()
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No [data] section"));
}

#[test]
fn project_without_log_fails() {
    let p = TestProject::new(SCENARIO_LOG);
    fs::remove_file(p.root().join("counter.log")).expect("remove log");
    p.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .log file"));
}

#[test]
fn missing_video_root_fails() {
    let p = TestProject::new(SCENARIO_LOG);
    fs::remove_dir_all(p.clips()).expect("remove clips");
    p.cmd()
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Video root not found"));
}

#[test]
fn review_rejects_bad_input_before_writing() {
    let p = TestProject::new(SCENARIO_LOG);

    p.cmd()
        .args(["review", "1001", "--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid direction"));

    p.cmd()
        .args(["review", "1001", "--count", "Coho"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid count spec"));

    p.cmd()
        .args(["review", "4242", "--species", "Coho"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Event 4242 not found"));

    p.cmd()
        .args(["list", "--filter", "reviewed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No events match"));
}

#[test]
fn export_into_missing_directory_fails() {
    let p = TestProject::new(SCENARIO_LOG);
    let out = p.out("nowhere").join("report.csv");
    p.cmd()
        .args(["export", "--force", "--file"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export to"));
}

#[test]
fn no_project_is_a_config_error() {
    let p = TestProject::new(SCENARIO_LOG);
    assert_cmd::cargo_bin_cmd!("fishreview")
        .env("FISHREVIEW_CONFIG_DIR", p.out("conf"))
        .args(["--test", "summary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project root set"));
}
