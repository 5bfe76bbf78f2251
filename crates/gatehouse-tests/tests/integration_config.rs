// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Config Integration Tests
//!
//! Loading configuration files and booting a gate from them:
//!
//! - Full YAML file to a serving router
//! - Environment placeholders and overrides
//! - TOML and JSON formats
//! - Validation failures and their exit codes
//!
//! ## Test Categories
//!
//! - `test_config_*`: Loading and validation
//! - `test_boot_*`: Components built from configuration

use std::io::Write;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use gatehouse_bin::{Components, RuntimeBuilder};
use gatehouse_config::{ConfigError, ConfigFormat, ConfigLoader, GatehouseConfig, LogLevel};
use gatehouse_tests::common::temp_test_dir;
use gatehouse_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

fn full_yaml() -> String {
    format!(
        r#"
server:
  host: 127.0.0.1
  port: ${{GATEHOUSE_TEST_PORT:9443}}
  base_path: /auth
  request_timeout: 10s
security:
  jwt_secret: "${{JWT_SECRET}}"
  algorithm: hs512
  token_ttl: 1h
session:
  store_timeout: 250ms
  purge_interval: 30s
logging:
  level: debug
  format: json
directory:
  permissions:
    - id: 1
      name: ALL
      grants_all: true
    - id: 5
      name: READ_USERS
  roles:
    - id: 1
      name: SUPERADMIN
      permissions: [1]
    - id: 2
      name: ADMIN
      permissions: [5]
  endpoints:
    - service: users
      path: /users
      method: GET
      permission: 5
  users:
    - email: {email}
      first_name: Ada
      last_name: Lovelace
      password_hash: '{hash}'
      roles: [2]
  default_roles: [2]
"#,
        email = ADMIN_EMAIL,
        hash = fixture_password_hash(),
    )
}

fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
    ConfigLoader::new().with_vars(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
}

fn load_full(vars: &[(&str, &str)]) -> Result<GatehouseConfig, ConfigError> {
    let dir = temp_test_dir("gatehouse_config");
    let path = write_config(&dir, "gatehouse.yaml", &full_yaml());
    loader(vars).load(&path)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_config_full_yaml() {
    let config = load_full(&[("JWT_SECRET", TEST_SECRET)]).unwrap();

    assert_eq!(config.server.port, 9443);
    assert_eq!(config.server.base_path, "/auth");
    assert_eq!(config.server.request_timeout, Duration::from_secs(10));
    assert_eq!(config.security.jwt_secret.as_ref().unwrap().expose(), TEST_SECRET);
    assert_eq!(config.security.token_ttl, Duration::from_secs(3600));
    assert_eq!(config.session.store_timeout, Duration::from_millis(250));
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.directory.users.len(), 1);
    assert_eq!(config.directory.users[0].email, ADMIN_EMAIL);
}

#[test]
fn test_config_secret_placeholder_must_resolve() {
    let err = load_full(&[]).unwrap_err();
    assert!(err.is_validation_error(), "unexpected error: {}", err);
}

#[test]
fn test_config_env_overrides_win() {
    let config = load_full(&[
        ("JWT_SECRET", TEST_SECRET),
        ("GATEHOUSE_TEST_PORT", "9500"),
        ("GATEHOUSE_PORT", "9600"),
        ("GATEHOUSE_TOKEN_TTL", "15m"),
    ])
    .unwrap();

    // The placeholder resolves first; the override is applied on top.
    assert_eq!(config.server.port, 9600);
    assert_eq!(config.security.token_ttl, Duration::from_secs(900));
}

#[test]
fn test_config_secret_never_serialized() {
    let config = load_full(&[("JWT_SECRET", TEST_SECRET)]).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains(TEST_SECRET));
    assert!(!format!("{:?}", config).contains(TEST_SECRET));
}

#[test]
fn test_config_toml_file() {
    let dir = temp_test_dir("gatehouse_config");
    let path = write_config(
        &dir,
        "gatehouse.toml",
        r#"
[server]
port = 8181

[security]
jwt_secret = "toml-secret"

[[directory.permissions]]
id = 5
name = "READ_USERS"
"#,
    );

    let config = loader(&[]).load(&path).unwrap();
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.directory.permissions.len(), 1);
}

#[test]
fn test_config_validation_failures() {
    let cases = [
        r#"{"security": {"jwt_secret": ""}}"#,
        r#"{"security": {"jwt_secret": "s", "algorithm": "RS256"}}"#,
        r#"{"security": {"jwt_secret": "s"}, "server": {"port": 0}}"#,
        r#"{"security": {"jwt_secret": "s"}, "server": {"base_path": "auth"}}"#,
    ];

    for json in cases {
        let result = loader(&[])
            .load_from_str(json, ConfigFormat::Json)
            .and_then(|config| config.validate().map(|_| config));
        assert!(result.is_err(), "accepted {}", json);
    }
}

#[test]
fn test_config_dangling_role_reference() {
    let json = r#"{
        "security": {"jwt_secret": "s"},
        "directory": {"roles": [{"id": 1, "name": "ADMIN", "permissions": [42]}]}
    }"#;
    let result = loader(&[])
        .load_from_str(json, ConfigFormat::Json)
        .and_then(|config| config.validate().map(|_| config));
    assert!(result.is_err());
}

// =============================================================================
// Boot
// =============================================================================

#[tokio::test]
async fn test_boot_login_with_seeded_user() {
    let config = load_full(&[("JWT_SECRET", TEST_SECRET)]).unwrap();
    let components = Components::build(&config).unwrap();
    assert_eq!(components.directory.user_count(), 1);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"email": ADMIN_EMAIL, "password": FIXTURE_PASSWORD}).to_string(),
        ))
        .unwrap();
    let response = components.server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(components.session_store.len(), 1);
}

#[tokio::test]
async fn test_boot_runtime_builder_from_file() {
    let dir = temp_test_dir("gatehouse_boot");
    let path = write_config(
        &dir,
        "gatehouse.json",
        r#"{"security": {"jwt_secret": "runtime-builder-secret"}}"#,
    );

    assert!(RuntimeBuilder::new().config_path(&path).build().is_ok());
}

#[test]
fn test_boot_missing_file_is_config_error() {
    let err = RuntimeBuilder::new()
        .config_path("/nonexistent/gatehouse.yaml")
        .build()
        .err()
        .unwrap();
    assert_eq!(err.exit_code(), gatehouse_bin::error::exit::CONFIG);
}
