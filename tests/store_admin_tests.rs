mod common;
use common::{SCENARIO_LOG, TestProject};
use predicates::prelude::*;

#[test]
fn init_creates_the_store_in_test_mode() {
    let p = TestProject::new(SCENARIO_LOG);
    p.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Test mode"))
        .stdout(predicate::str::contains("counter.log"));

    assert!(p.root().join("fishcounter.sqlite").exists());
    assert!(!p.out("conf").join("fishreview.conf").exists());
}

#[test]
fn db_info_and_check() {
    let p = TestProject::new(SCENARIO_LOG);
    p.cmd().args(["review", "1001", "-s", "Coho"]).assert().success();

    p.cmd()
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decisions:"))
        .stdout(predicate::str::contains("Integrity check passed"));
}

#[test]
fn log_print_shows_reviews_and_exports() {
    let p = TestProject::new(SCENARIO_LOG);
    p.cmd().args(["review", "1002", "-s", "Coho"]).assert().success();

    let out = p.out("r.csv");
    p.cmd()
        .args(["export", "--force", "--file"])
        .arg(&out)
        .assert()
        .success();

    p.cmd()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("migration_applied"));
}

#[test]
fn backup_writes_a_copy() {
    let p = TestProject::new(SCENARIO_LOG);
    p.cmd().args(["review", "1002", "-s", "Coho"]).assert().success();

    let dest = p.out("backups").join("store.sqlite");
    p.cmd()
        .args(["backup", "--file"])
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created"));
    assert!(dest.exists());

    p.cmd()
        .args(["backup", "--compress", "--force", "--file"])
        .arg(&dest)
        .assert()
        .success();
    assert!(p.out("backups").join("store.zip").exists());
}

#[test]
fn custom_db_path_is_used() {
    let p = TestProject::new(SCENARIO_LOG);
    let db = p.out("elsewhere.sqlite");
    p.cmd()
        .arg("--db")
        .arg(&db)
        .args(["review", "1001", "-s", "Coho"])
        .assert()
        .success();
    assert!(db.exists());
    assert!(!p.root().join("fishcounter.sqlite").exists());
}
