//! End-to-end dry run against a Trac database fixture.

use std::path::Path;
use std::process::Command;

use rusqlite::Connection;
use serde_json::Value;

const SCHEMA: &str = "
    CREATE TABLE ticket (
        id integer PRIMARY KEY, type text, time integer, changetime integer,
        component text, severity text, priority text, owner text, reporter text,
        cc text, version text, milestone text, status text, resolution text,
        summary text, description text, keywords text);
    CREATE TABLE ticket_change (
        ticket integer, time integer, author text, field text,
        oldvalue text, newvalue text);
    CREATE TABLE attachment (
        type text, id text, filename text, size integer, time integer,
        description text, author text, ipnr text);
    CREATE TABLE milestone (
        name text PRIMARY KEY, due integer, completed integer, description text);
";

const FIXTURE: &str = "
    INSERT INTO ticket (id, type, time, changetime, component, priority, owner, reporter,
                        milestone, status, resolution, summary, description)
    VALUES (1, 'defect', 1230768000000000, 1233446400000000, 'raster', 'medium', 'pramsey',
            'strk', '2.0', 'closed', 'fixed', 'ST_Union crashes', NULL),
           (2, 'enhancement', 1235865600000000, 1235865600000000, NULL, NULL, NULL,
            'robe', '9.9', 'new', NULL, 'Faster ST_DWithin', NULL),
           (3, 'task', 1238544000000000, 1238544000000000, NULL, NULL, NULL,
            'robe', NULL, 'new', NULL, 'Docs', 'x');
    INSERT INTO ticket_change VALUES
        (1, 1231372800000000, 'pramsey', 'comment', '1', 'Fixed in r500.'),
        (1, 1231372800000000, 'pramsey', 'resolution', '', 'fixed');
    INSERT INTO attachment VALUES
        ('ticket', '1', 'crash case.sql', 120, 1230854400000000, 'reproduces it', 'strk', NULL);
    INSERT INTO milestone VALUES ('2.0', 1262304000000000, 1270000000000000, 'Big release');
";

const CONFIG: &str = "
github: { owner: osgeo, repo: postgis }
trac:
  database: trac.db
  attachment_url: https://trac.osgeo.org/postgis/attachment/ticket/
  ticket_url: https://trac.osgeo.org/postgis/ticket/
revmap: revs.txt
users:
  pramsey: pramsey
labels:
  type:
    defect: bug
    enhancement: { name: enhancement, color: a2eeef }
  component:
    raster: Raster
";

fn fixture(dir: &Path) {
    let conn = Connection::open(dir.join("trac.db")).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(FIXTURE).unwrap();
    conn.execute("UPDATE ticket SET description = ?1 WHERE id = 1", ["'''Bug''' in r500"])
        .unwrap();
    std::fs::write(dir.join("revs.txt"), "500\tdeadbeef\n").unwrap();
    std::fs::write(dir.join("migrate.yaml"), CONFIG).unwrap();
}

fn run_in(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_trac-migrate"))
        .args(args)
        .current_dir(dir)
        .env_remove("GITHUB_TOKEN")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run trac-migrate binary")
}

fn payload(dir: &Path, ticket: u64) -> Value {
    let text = std::fs::read_to_string(dir.join("out").join(format!("{ticket}.json"))).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn dry_run_writes_one_payload_per_ticket() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let output = run_in(dir.path(), &["migrate", "--config", "migrate.yaml", "--out", "out"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Exported 3 tickets through #3"));

    let first = payload(dir.path(), 1);
    let issue = &first["issue"];
    assert_eq!(issue["title"], "ST_Union crashes");
    assert_eq!(issue["closed"], true);
    assert_eq!(issue["closed_at"], "2009-02-01T00:00:00Z");
    assert_eq!(issue["created_at"], "2009-01-01T00:00:00Z");
    assert_eq!(issue["assignee"], "pramsey");
    assert_eq!(issue["milestone"], 1);
    assert_eq!(issue["labels"], serde_json::json!(["bug", "Raster"]));
    let body = issue["body"].as_str().unwrap();
    assert!(body.starts_with("**Reported by strk**\n\n**Bug** in deadbeef"));
    assert!(body.ends_with("Migrated from https://trac.osgeo.org/postgis/ticket/1"));

    let comments = first["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments[0]["body"]
        .as_str()
        .unwrap()
        .contains("(https://trac.osgeo.org/postgis/attachment/ticket/1/crash%20case.sql)"));
    assert_eq!(comments[1]["body"], "**@pramsey** commented:\n\nFixed in deadbeef.");
    assert_eq!(comments[1]["created_at"], "2009-01-08T00:00:00Z");
}

#[test]
fn missing_milestone_and_unconfigured_labels_are_omitted() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let output = run_in(dir.path(), &["migrate", "--config", "migrate.yaml", "--out", "out"]);
    assert!(output.status.success());

    let second = payload(dir.path(), 2);
    assert!(second["issue"].get("milestone").is_none());
    assert_eq!(second["issue"]["labels"], serde_json::json!(["enhancement"]));
    assert!(second["issue"].get("closed_at").is_none());

    let third = payload(dir.path(), 3);
    assert!(third["issue"].get("labels").is_none());
    assert!(third["issue"].get("assignee").is_none());
    assert_eq!(third["comments"], serde_json::json!([]));
}

#[test]
fn start_and_limit_select_tickets() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let output = run_in(
        dir.path(),
        &["migrate", "--config", "migrate.yaml", "--start", "2", "--limit", "1", "--out", "out"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("next run starts at 3"));
    assert!(!dir.path().join("out").join("1.json").exists());
    assert!(dir.path().join("out").join("2.json").exists());
    assert!(!dir.path().join("out").join("3.json").exists());
}

#[test]
fn live_run_requires_token() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let output = run_in(dir.path(), &["migrate", "--config", "migrate.yaml", "--really"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("GITHUB_TOKEN"));
}

#[test]
fn missing_database_fails_before_any_ticket() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("migrate.yaml"), "github: {owner: o, repo: r}\ntrac: {database: absent.db}\n")
        .unwrap();

    let output = run_in(dir.path(), &["migrate", "--config", "migrate.yaml", "--out", "out"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ticket store error"));
    assert!(!dir.path().join("out").exists());
}
