//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use clitools::cli::{parse_args_from, Args, Task};
use clitools::config::Config;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("ct")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.config.is_none());
    assert!(result.log_level.is_none());
    assert!(!result.dry_run);
    assert!(!result.no_strict);
    assert!(result.task.is_none());
}

#[test]
fn test_cli_globals_before_task() {
    let result = parse_args_from(args(&[
        "--dry-run",
        "-l",
        "trace",
        "docker:exec",
        "app",
        "psql",
        "-c",
        "SELECT 1",
    ]))
    .unwrap();

    assert!(result.dry_run);
    assert_eq!(result.log_level, Some("trace".to_string()));
    // `-c` after the task belongs to psql, not to us
    assert!(result.config.is_none());
    assert_eq!(
        result.task,
        Some(Task::DockerExec {
            container: "app".into(),
            argv: vec!["psql".into(), "-c".into(), "SELECT 1".into()],
        })
    );
}

#[test]
fn test_cli_ssh_with_command() {
    let result = parse_args_from(args(&["ssh", "deploy@web1", "tail", "-f", "/var/log/syslog"]))
        .unwrap();

    assert_eq!(
        result.task,
        Some(Task::Ssh {
            host: "deploy@web1".into(),
            argv: vec!["tail".into(), "-f".into(), "/var/log/syslog".into()],
        })
    );
}

#[test]
fn test_cli_sudo_keeps_subcommand() {
    let result = parse_args_from(args(&["sudo", "mysql:dump", "shop"])).unwrap();

    assert_eq!(
        result.task,
        Some(Task::Sudo {
            argv: vec!["mysql:dump".into(), "shop".into()],
        })
    );
}

#[test]
fn test_cli_missing_values() {
    assert!(parse_args_from(args(&["exec"])).is_err());
    assert!(parse_args_from(args(&["ssh"])).is_err());
    assert!(parse_args_from(args(&["sudo"])).is_err());
    assert!(parse_args_from(args(&["-c"])).is_err());
}

#[test]
fn test_cli_mysql_ping_rejects_arguments() {
    assert_eq!(
        parse_args_from(args(&["mysql:ping"])).unwrap().task,
        Some(Task::MysqlPing)
    );
    assert!(parse_args_from(args(&["mysql:ping", "extra"])).is_err());
}

#[test]
fn test_cli_mysql_dump_rejects_second_database() {
    assert!(parse_args_from(args(&["mysql:dump", "shop", "blog"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "tools": {
            "shell": "bash",
            "ssh": "/usr/local/bin/ssh",
            "docker": "podman"
        },
        "execution": {
            "strict": false,
            "poll_interval_ms": 50
        },
        "mysql": {
            "host": "db.internal",
            "port": 3307,
            "user": "app"
        },
        "logging": {
            "level": "debug"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.tools.shell, "bash");
    assert_eq!(config.tools.ssh, "/usr/local/bin/ssh");
    assert_eq!(config.tools.docker, "podman");
    assert!(!config.execution.strict);
    assert_eq!(config.execution.poll_interval_ms, 50);
    assert_eq!(config.mysql.host, "db.internal");
    assert_eq!(config.mysql.port, 3307);
    assert_eq!(config.mysql.user, "app");
    assert!(config.mysql.password.is_none());
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_priority_cli_over_file() {
    let json = r#"{
        "execution": { "strict": true },
        "logging": { "level": "warn" }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let args = Args {
        config: Some(file.path().to_path_buf()),
        no_strict: true,
        log_level: Some("trace".to_string()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    // CLI values should win
    assert!(!config.execution.strict);
    assert_eq!(config.log_filter(), "trace");
}

#[test]
fn test_config_load_rejects_invalid_values() {
    let json = r#"{ "execution": { "poll_interval_ms": 0 } }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let args = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let err = Config::load(&args).unwrap_err();
    assert!(err.to_string().contains("poll_interval_ms"));
}

#[test]
fn test_config_load_missing_file() {
    let args = Args {
        config: Some("/nonexistent/ct.json".into()),
        ..Args::default()
    };

    assert!(Config::load(&args).is_err());
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_roundtrip() {
    let original = Config::default();
    let json = serde_json::to_string(&original).unwrap();
    let loaded: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(original.tools.shell, loaded.tools.shell);
    assert_eq!(original.mysql.port, loaded.mysql.port);
    assert_eq!(original.execution.strict, loaded.execution.strict);
}

#[test]
fn test_config_partial_deserialization() {
    // Only specify some fields, others should use defaults
    let json = r#"{"mysql": {"port": 3310}}"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.mysql.port, 3310);
    assert_eq!(config.mysql.host, "127.0.0.1"); // Default
    assert_eq!(config.tools.docker, "docker"); // Default
    assert!(config.execution.strict); // Default
}

// ============================================================================
// Binary Dry-run Tests
// ============================================================================

/// Run `ct` with a clean tool environment and return stdout.
fn ct_dry_run(args: &[&str]) -> String {
    let mut command = std::process::Command::new(env!("CARGO_BIN_EXE_ct"));
    command.arg("--dry-run").args(args);
    for var in [
        "CLITOOLS_SHELL",
        "CLITOOLS_SSH",
        "CLITOOLS_DOCKER",
        "CLITOOLS_MYSQL_HOST",
        "CLITOOLS_MYSQL_USER",
        "CLITOOLS_MYSQL_PASSWORD",
    ] {
        command.env_remove(var);
    }

    let output = command.output().unwrap();
    assert!(output.status.success(), "ct {:?} failed", args);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_dry_run_mysql_ping() {
    assert_eq!(
        ct_dry_run(&["mysql:ping"]).trim_end(),
        "mysqladmin --host='127.0.0.1' --port='3306' --user='root' ping > /dev/null 2>&1"
    );
}

#[test]
fn test_dry_run_docker_exec() {
    assert_eq!(
        ct_dry_run(&["docker:exec", "app", "echo", "it's"]).trim_end(),
        r"docker exec -i 'app' sh -c 'echo '\''it'\''\'\'''\''s'\'''"
    );
}

#[test]
fn test_dry_run_ssh_login() {
    assert_eq!(ct_dry_run(&["ssh", "web1"]).trim_end(), "ssh -t 'web1'");
}
