mod support;

use assert_cmd::Command;
use predicates::prelude::*;

use support::config::write_temp_config;

fn coinbridge() -> Command {
    let mut cmd = Command::cargo_bin("coinbridge").expect("binary built");
    cmd.env_remove("COINBRIDGE_ACCESS_KEY")
        .env_remove("COINBRIDGE_SECRET_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_every_command() {
    coinbridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("balances")
                .and(predicate::str::contains("orders"))
                .and(predicate::str::contains("place"))
                .and(predicate::str::contains("cancel"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn place_rejects_unknown_side() {
    coinbridge()
        .args(["place", "--pair", "BTC/USDT", "--side", "hold", "--amount", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'hold'"));
}

#[test]
fn missing_credentials_fail_before_any_request() {
    let file = write_temp_config("[exchange]\nkind = \"huobi\"\n");
    coinbridge()
        .arg("--config")
        .arg(file.path())
        .arg("balances")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exchange.access_key"));
}

#[test]
fn missing_config_file_is_reported() {
    coinbridge()
        .args(["--config", "/nonexistent/coinbridge.toml", "balances"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}
