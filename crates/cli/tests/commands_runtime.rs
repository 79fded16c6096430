use std::env;
use std::sync::{Mutex, OnceLock};

use rentbot_cli::commands::{doctor, inventory, migrate, seed};
use rentbot_cli::InventoryAction;
use rust_decimal::Decimal;
use serde_json::Value;

#[test]
fn migrate_returns_success_on_memory_database() {
    with_env(&[("RENTBOT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert!(payload["error_class"].is_null());
    });
}

#[test]
fn openai_without_key_is_a_config_failure() {
    with_env(
        &[("RENTBOT_DATABASE_URL", "sqlite::memory:"), ("RENTBOT_LLM_PROVIDER", "openai")],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 2, "expected config validation failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "config_validation");
            assert!(payload["message"].as_str().unwrap_or_default().contains("llm.api_key"));
        },
    );
}

#[test]
fn seed_loads_once_then_skips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("RENTBOT_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "{}", first.output);
        assert_eq!(
            parse_payload(&first.output)["message"],
            "seeded 19 vehicles into the empty catalog"
        );

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "{}", second.output);
        assert_eq!(
            parse_payload(&second.output)["message"],
            "catalog already holds 19 vehicles; seed skipped"
        );
    });
}

#[test]
fn inventory_updates_persist_between_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("RENTBOT_DATABASE_URL", url.as_str())], || {
        assert_eq!(seed::run().exit_code, 0);

        let priced = inventory::run(InventoryAction::SetPrice { id: 1, price: Decimal::new(9950, 2) });
        assert_eq!(priced.exit_code, 0, "{}", priced.output);
        let message = parse_payload(&priced.output)["message"].as_str().unwrap_or_default().to_string();
        assert!(message.starts_with("#1 "), "{message}");
        assert!(message.contains("AED 99.50/day"), "{message}");

        let hidden = inventory::run(InventoryAction::SetAvailability { id: 1, available: false });
        assert_eq!(hidden.exit_code, 0, "{}", hidden.output);
        assert!(parse_payload(&hidden.output)["message"]
            .as_str()
            .unwrap_or_default()
            .ends_with("[unavailable]: marked unavailable"));

        let available = parse_payload(&inventory::run(InventoryAction::List { all: false }).output);
        let available = available["message"].as_str().unwrap_or_default().to_string();
        assert!(available.starts_with("18 vehicles:"), "{available}");
        assert!(!available.contains("#1 "), "{available}");

        let everything = parse_payload(&inventory::run(InventoryAction::List { all: true }).output);
        assert!(everything["message"].as_str().unwrap_or_default().starts_with("19 vehicles:"));
    });
}

#[test]
fn inventory_rejects_unknown_vehicles_and_bad_prices() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("RENTBOT_DATABASE_URL", url.as_str())], || {
        assert_eq!(seed::run().exit_code, 0);

        let missing = inventory::run(InventoryAction::SetAvailability { id: 999, available: true });
        assert_eq!(missing.exit_code, 7);
        assert_eq!(parse_payload(&missing.output)["error_class"], "not_found");

        let free = inventory::run(InventoryAction::SetPrice { id: 2, price: Decimal::ZERO });
        assert_eq!(free.exit_code, 8);
        assert_eq!(parse_payload(&free.output)["error_class"], "invalid_input");
    });
}

#[test]
fn doctor_json_reports_every_check() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("RENTBOT_DATABASE_URL", url.as_str())], || {
        let empty = doctor::run(true);
        assert_eq!(empty.exit_code, 1, "{}", empty.output);
        let payload = parse_payload(&empty.output);
        assert_eq!(payload["overall_status"], "fail");
        let names: Vec<&str> = payload["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .filter_map(|check| check["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec!["config_validation", "llm_endpoint", "database_connectivity", "catalog_readiness"]
        );
        assert_eq!(payload["checks"][3]["status"], "fail");

        assert_eq!(seed::run().exit_code, 0);
        let ready = doctor::run(true);
        assert_eq!(ready.exit_code, 0, "{}", ready.output);
        assert_eq!(parse_payload(&ready.output)["overall_status"], "pass");
    });
}

#[test]
fn doctor_skips_remaining_checks_after_config_failure() {
    with_env(&[("RENTBOT_LLM_PROVIDER", "openai")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["checks"][0]["status"], "fail");
        for index in 1..4 {
            assert_eq!(payload["checks"][index]["status"], "skipped");
        }
    });
}

fn database_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("rentbot.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "RENTBOT_DATABASE_URL",
        "RENTBOT_DATABASE_MAX_CONNECTIONS",
        "RENTBOT_DATABASE_TIMEOUT_SECS",
        "RENTBOT_LLM_PROVIDER",
        "RENTBOT_LLM_API_KEY",
        "OPENAI_API_KEY",
        "RENTBOT_LLM_BASE_URL",
        "RENTBOT_LLM_MODEL",
        "RENTBOT_LLM_TIMEOUT_SECS",
        "RENTBOT_LLM_MAX_RETRIES",
        "RENTBOT_SERVER_BIND_ADDRESS",
        "RENTBOT_SERVER_PORT",
        "RENTBOT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "RENTBOT_SERVER_STATIC_DIR",
        "RENTBOT_ASSISTANT_CURRENCY_CODE",
        "RENTBOT_ASSISTANT_SEED_CATALOG",
        "RENTBOT_MESSAGING_ENABLED",
        "RENTBOT_REPORTS_ENABLED",
        "RENTBOT_REPORTS_RECIPIENT",
        "RENTBOT_LOGGING_LEVEL",
        "RENTBOT_LOGGING_FORMAT",
        "RENTBOT_LOG_LEVEL",
        "RENTBOT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
