use std::env;
use std::process::Command;

const ENV_PREFIX: &str = "BUDGET_TRACKER_BUILD";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    let git_status = match command_output("git", &["status", "--porcelain"]) {
        Some(changes) if changes.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let rustc = command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string());

    let values = [
        ("HASH", git_hash),
        ("STATUS", git_status.to_string()),
        ("TIMESTAMP", timestamp),
        ("TARGET", env_or("TARGET", "unknown-target")),
        ("PROFILE", env_or("PROFILE", "unknown-profile")),
        ("RUSTC", rustc),
    ];
    for (key, value) in values {
        println!("cargo:rustc-env={ENV_PREFIX}_{key}={value}");
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Trimmed stdout of a successful command. `git status --porcelain` on a
/// clean tree yields `Some("")`.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
