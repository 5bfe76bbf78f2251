// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use gatehouse_config::{ConfigLoader, GatehouseConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ConfigLoader::new()
        .load(config_path)
        .map_err(|e| BinError::from(e).with_context(format!("validating {}", config_path.display())))?;
    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen: {}", config.server.socket_addr());
            println!("  Base path: {}", config.server.base_path);
            println!("  Algorithm: {}", config.security.algorithm);
            println!("  Token TTL: {:?}", config.security.token_ttl);
            println!("  Permissions: {}", config.directory.permissions.len());
            println!("  Roles: {}", config.directory.roles.len());
            println!("  Endpoints: {}", config.directory.endpoints.len());
            println!("  Users: {}", config.directory.users.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "base_path": config.server.base_path,
                    "algorithm": config.security.algorithm,
                    "permissions": config.directory.permissions.len(),
                    "roles": config.directory.roles.len(),
                    "endpoints": config.directory.endpoints.len(),
                    "users": config.directory.users.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
    }

    Ok(())
}

/// Things that are legal but probably not intended.
fn collect_warnings(config: &GatehouseConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.directory.endpoints.is_empty() {
        warnings.push("No endpoints registered; every introspection will be denied".to_string());
    }
    if config.directory.default_roles.is_empty() {
        warnings.push("No default roles; self-registered users hold no permissions".to_string());
    }
    if config
        .security
        .jwt_secret
        .as_ref()
        .is_some_and(|s| s.expose().len() < 32)
    {
        warnings.push("JWT secret is shorter than 32 bytes".to_string());
    }

    warnings
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::internal(format!("Failed to serialize output: {}", e)))
}
