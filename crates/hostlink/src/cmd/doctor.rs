use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use hostlink_transport::LinkConfig;
use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_check(),
        runtime_dir_check(config),
        endpoint_check("sensor_endpoint", &config.sensor_endpoint()),
        endpoint_check("display_endpoint", &config.display_endpoint()),
        compiled_features_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn platform_check() -> CheckResult {
    #[cfg(unix)]
    {
        CheckResult {
            name: "platform".to_string(),
            status: CheckStatus::Pass,
            detail: "Unix domain sockets and descriptor passing available".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "platform".to_string(),
            status: CheckStatus::Fail,
            detail: "hostlink requires Unix domain sockets".to_string(),
        }
    }
}

fn runtime_dir_check(config: &LinkConfig) -> CheckResult {
    let dir = &config.runtime_dir;
    if !dir.exists() {
        // The host creates the directory; its absence just means the host
        // hasn't started, which every client absorbs at runtime.
        return CheckResult {
            name: "runtime_dir".to_string(),
            status: CheckStatus::Warn,
            detail: format!("{} does not exist (host not running?)", dir.display()),
        };
    }
    if !dir.is_dir() {
        return CheckResult {
            name: "runtime_dir".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{} exists but is not a directory", dir.display()),
        };
    }
    CheckResult {
        name: "runtime_dir".to_string(),
        status: CheckStatus::Pass,
        detail: dir.display().to_string(),
    }
}

fn endpoint_check(name: &str, path: &Path) -> CheckResult {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_socket() => CheckResult {
            name: name.to_string(),
            status: CheckStatus::Pass,
            detail: format!("{} is a socket", path.display()),
        },
        Ok(_) => CheckResult {
            name: name.to_string(),
            status: CheckStatus::Fail,
            detail: format!("{} exists but is not a socket", path.display()),
        },
        Err(_) => CheckResult {
            name: name.to_string(),
            status: CheckStatus::Warn,
            detail: format!("{} not present (host not running?)", path.display()),
        },
    }
}

fn compiled_features_check() -> CheckResult {
    let mut features = vec!["cli"];
    if cfg!(target_os = "linux") {
        features.push("memfd test buffers");
    }
    CheckResult {
        name: "compiled_features".to_string(),
        status: CheckStatus::Info,
        detail: features.join(", "),
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("hostlink doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_endpoints_warn_rather_than_fail() {
        let config = LinkConfig::new("/nonexistent/hostlink-doctor-test");
        let check = endpoint_check("sensor_endpoint", &config.sensor_endpoint());
        assert!(matches!(check.status, CheckStatus::Warn));
    }

    #[test]
    fn doctor_output_serializes() {
        let output = DoctorOutput {
            checks: vec![CheckResult {
                name: "x".to_string(),
                status: CheckStatus::Pass,
                detail: "ok".to_string(),
            }],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
    }
}
