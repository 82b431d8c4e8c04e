use assert_cmd::Command;
use predicates::str::contains;
use regex::Regex;
use tempfile::TempDir;

fn shell(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("budget_tracker_cli").unwrap();
    cmd.env("BUDGET_TRACKER_CLI_SCRIPT", "1")
        .env("BUDGET_TRACKER_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = TempDir::new().unwrap();
    let input = "signup Ada ada@example.com Secret12!\n\
                 add income 100 Salary\n\
                 add expense 40 Groceries\n\
                 dashboard\n\
                 exit\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Welcome, Ada!"))
        .stdout(contains("Balance : ₺60.00"))
        .stdout(contains("Week 1"))
        .stdout(contains("Groceries"));

    let store = std::fs::read_to_string(home.path().join("store.json")).unwrap();
    assert!(store.contains("ada@example.com"));
    assert!(!store.contains("Secret12!"));
}

#[test]
fn history_json_lists_every_transaction() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("signup Ada ada@example.com Secret12!\nadd income 10\nadd expense 2.50 Coffee\n")
        .assert()
        .success();

    let output = shell(&home)
        .write_stdin("history --json\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let id = Regex::new(r"^[0-9a-f]{32}$").unwrap();
    for row in rows {
        assert!(id.is_match(row["id"].as_str().unwrap()));
    }
    let kinds: Vec<&str> = rows.iter().filter_map(|row| row["kind"].as_str()).collect();
    assert!(kinds.contains(&"income"));
    assert!(kinds.contains(&"expense"));
}

#[test]
fn friend_debts_show_standing() {
    let home = TempDir::new().unwrap();
    let input = "signup Ada ada@example.com Secret12!\n\
                 friend add Bob\n\
                 debt add Bob i-paid 50\n\
                 debt add Bob they-paid 20\n\
                 friend list\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Bob: To receive: ₺30.00"))
        .stdout(contains("To receive: ₺30.00   To pay: ₺0.00"));
}

#[test]
fn errors_are_reported_and_the_script_continues() {
    let home = TempDir::new().unwrap();
    let input = "dashboard\n\
                 dashbord\n\
                 login ada@example.com wrongpass\n\
                 version\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("[x] Not signed in."))
        .stdout(contains("Suggestion: `dashboard`?"))
        .stdout(contains("No account exists with this email"))
        .stdout(contains("Budget Tracker"));
}

#[test]
fn version_json_is_machine_readable() {
    let home = TempDir::new().unwrap();
    let output = shell(&home)
        .write_stdin("version --json\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let meta: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(meta["version"], env!("CARGO_PKG_VERSION"));
}
