use almanac_core::config::{AppConfig, LoadOptions};
use almanac_db::{connect_with_settings, ping};
use secrecy::ExposeSecret;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 4] = [
    "telegram_token_readiness",
    "classifier_readiness",
    "operator_configured",
    "database_connectivity",
];

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_telegram_token(&config));
            checks.push(check_classifier(&config));
            checks.push(check_operator(&config));
            checks.push(check_database_connectivity(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    // Warnings are reported but do not fail the run.
    let healthy = checks
        .iter()
        .all(|check| matches!(check.status, CheckStatus::Pass | CheckStatus::Warn));
    let overall_status = if healthy { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if healthy {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_telegram_token(config: &AppConfig) -> DoctorCheck {
    let bot_id = config
        .telegram
        .bot_token
        .expose_secret()
        .split_once(':')
        .map(|(bot_id, _)| bot_id.to_string())
        .unwrap_or_default();
    DoctorCheck {
        name: "telegram_token_readiness",
        status: CheckStatus::Pass,
        details: format!("token shape validated for bot id {bot_id}"),
    }
}

fn check_classifier(config: &AppConfig) -> DoctorCheck {
    match &config.llm.api_key {
        Some(_) => DoctorCheck {
            name: "classifier_readiness",
            status: CheckStatus::Pass,
            details: format!("api key present for model `{}`", config.llm.model),
        },
        None => DoctorCheck {
            name: "classifier_readiness",
            status: CheckStatus::Fail,
            details: "llm.api_key is not set".to_string(),
        },
    }
}

fn check_operator(config: &AppConfig) -> DoctorCheck {
    match &config.authz.privileged_user_id {
        Some(user_id) => DoctorCheck {
            name: "operator_configured",
            status: CheckStatus::Pass,
            details: format!("mutations allowed for user id {user_id}"),
        },
        None => DoctorCheck {
            name: "operator_configured",
            status: CheckStatus::Warn,
            details: "authz.privileged_user_id is unset; add, update and /delete will be denied"
                .to_string(),
        },
    }
}

fn check_database_connectivity(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;
        let pinged = ping(&pool).await.map_err(|error| format!("database query failed: {error}"));

        pool.close().await;
        pinged
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        },
        Err(error) => {
            DoctorCheck { name: "database_connectivity", status: CheckStatus::Fail, details: error }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
