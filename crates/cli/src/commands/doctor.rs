use rentbot_core::config::{AppConfig, LlmProvider, LoadOptions};
use rentbot_db::{connect_with_settings, DbPool, SqlVehicleRepository, VehicleRepository};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass("config_validation", "configuration loaded and validated"));
            checks.push(check_llm_endpoint(&config));
            checks.extend(check_storage(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string()));
            for name in ["llm_endpoint", "database_connectivity", "catalog_readiness"] {
                checks.push(DoctorCheck::skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Reports the endpoint the assistant will call. No request is made; an unreachable model server
/// only shows up at turn time as an apology reply.
fn check_llm_endpoint(config: &AppConfig) -> DoctorCheck {
    let base_url = config.llm_base_url();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return DoctorCheck::fail(
            "llm_endpoint",
            format!("base url `{base_url}` must start with http:// or https://"),
        );
    }

    let credentials = match (config.llm.provider, config.llm.api_key.is_some()) {
        (_, true) => "api key present",
        (LlmProvider::Ollama, false) => "no api key required",
        (LlmProvider::OpenAi, false) => {
            return DoctorCheck::fail("llm_endpoint", "openai provider selected without an api key");
        }
    };

    DoctorCheck::pass(
        "llm_endpoint",
        format!(
            "{:?} model `{}` at {base_url} ({credentials})",
            config.llm.provider, config.llm.model
        ),
    )
}

fn check_storage(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck::fail(
                    "database_connectivity",
                    format!("failed to initialize async runtime: {error}"),
                ),
                DoctorCheck::skipped("catalog_readiness", "the database was not reachable"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck::fail(
                        "database_connectivity",
                        format!("failed to connect to database: {error}"),
                    ),
                    DoctorCheck::skipped("catalog_readiness", "the database was not reachable"),
                ];
            }
        };

        let checks = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
            Ok(_) => vec![
                DoctorCheck::pass(
                    "database_connectivity",
                    format!("connected using `{}`", config.database.url),
                ),
                check_catalog(&pool).await,
            ],
            Err(error) => vec![
                DoctorCheck::fail("database_connectivity", format!("probe query failed: {error}")),
                DoctorCheck::skipped("catalog_readiness", "the database was not reachable"),
            ],
        };

        pool.close().await;
        checks
    })
}

async fn check_catalog(pool: &DbPool) -> DoctorCheck {
    match SqlVehicleRepository::new(pool.clone()).count().await {
        Ok(0) => DoctorCheck::fail(
            "catalog_readiness",
            "vehicle catalog is empty; run `rentbot seed` to load the demo fleet",
        ),
        Ok(count) => DoctorCheck::pass("catalog_readiness", format!("{count} vehicles in catalog")),
        Err(error) => DoctorCheck::fail(
            "catalog_readiness",
            format!("catalog query failed ({error}); run `rentbot migrate` then `rentbot seed`"),
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
