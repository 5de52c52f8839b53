//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use auth_context::cli::{parse_args_from, Args};
use auth_context::config::Config;
use auth_context::IdentityService;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("auth-context")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.host.is_none());
    assert!(result.port.is_none());
    assert!(result.config.is_none());
    assert!(result.log_level.is_none());
    assert!(!result.version);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-H",
        "0.0.0.0",
        "-p",
        "8080",
        "-l",
        "debug",
        "-c",
        "/etc/auth-context.json",
    ]))
    .unwrap();

    assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
    assert_eq!(result.port, Some(8080));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert_eq!(
        result.config.unwrap().to_str().unwrap(),
        "/etc/auth-context.json"
    );
}

#[test]
fn test_cli_invalid_port() {
    let result = parse_args_from(args(&["-p", "not-a-number"]));
    assert!(result.is_err());
}

#[test]
fn test_cli_port_out_of_range() {
    let result = parse_args_from(args(&["-p", "70000"]));
    assert!(result.is_err());
}

#[test]
fn test_cli_missing_value() {
    let result = parse_args_from(args(&["--port"]));
    assert!(result.is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let file = config_file(
        r#"{
        "server": {
            "host": "192.168.1.100",
            "port": 9000,
            "graceful_shutdown": false
        },
        "identity": {
            "session_ttl_secs": 120,
            "latency_ms": 10,
            "accounts": [
                { "email": "a@example.com", "password": "one" },
                { "email": "b@example.com", "password": "two" }
            ]
        },
        "logging": {
            "level": "debug"
        }
    }"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.host, "192.168.1.100");
    assert_eq!(config.server.port, 9000);
    assert!(!config.server.graceful_shutdown);
    assert_eq!(config.identity.session_ttl_secs, 120);
    assert_eq!(config.identity.latency_ms, 10);
    assert_eq!(config.identity.accounts.len(), 2);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_invalid_json() {
    let file = config_file("{ not json");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_config_priority_cli_over_file() {
    let file = config_file(
        r#"{
        "server": {
            "host": "10.0.0.1",
            "port": 5000
        }
    }"#,
    );

    let args = Args {
        host: Some("192.168.1.1".parse().unwrap()),
        port: Some(8080),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    assert_eq!(config.server.host, "192.168.1.1");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn test_config_file_kept_without_cli_overrides() {
    let file = config_file(r#"{ "server": { "port": 5000 } }"#);

    let args = parse_args_from(args(&["-c", file.path().to_str().unwrap()])).unwrap();
    let config = Config::load(&args).unwrap();

    assert_eq!(config.server.port, 5000);
}

#[test]
fn test_config_to_server_config() {
    let file = config_file(r#"{ "server": { "graceful_shutdown": false } }"#);
    let args = Args {
        host: Some("0.0.0.0".parse().unwrap()),
        port: Some(8080),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    let server_config = config.to_server_config().unwrap();

    assert_eq!(server_config.host, "0.0.0.0");
    assert_eq!(server_config.port, 8080);
    assert!(!server_config.graceful_shutdown);
}

#[tokio::test]
async fn test_seeded_accounts_can_sign_in() {
    let file = config_file(
        r#"{ "identity": { "accounts": [ { "email": "demo@example.com", "password": "demo" } ] } }"#,
    );

    let config = Config::from_file(file.path()).unwrap();
    let identity = config.identity_service().unwrap();

    let signed_in = identity
        .sign_in_with_password("demo@example.com", "demo")
        .await
        .unwrap();
    assert_eq!(signed_in.user.email, "demo@example.com");
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_roundtrip() {
    let original = Config::default();
    let json = serde_json::to_string(&original).unwrap();
    let loaded: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(original.server.host, loaded.server.host);
    assert_eq!(original.server.port, loaded.server.port);
    assert_eq!(
        original.identity.session_ttl_secs,
        loaded.identity.session_ttl_secs
    );
}

#[test]
fn test_config_partial_deserialization() {
    // Only specify some fields, others should use defaults
    let json = r#"{"server": {"port": 9999}}"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.host, "127.0.0.1"); // Default
    assert!(config.server.graceful_shutdown); // Default
    assert_eq!(config.identity.session_ttl_secs, 3600); // Default
}
