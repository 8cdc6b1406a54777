// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use campus_config::CampusConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::load_campus_config;

/// Loads and validates the configuration, then prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(BinError::invalid_input(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
    }

    let config = load_campus_config(cli.config.as_deref())?;
    let warnings = collect_warnings(&config);
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults and environment)".to_string());

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  API: {}", config.api.socket_addr());
            println!("  Token TTL: {} minutes", config.auth.token_ttl_minutes);
            println!("  Issuer: {}", config.auth.issuer);
            println!(
                "  Signing secret: {}",
                if config.auth.jwt_secret.is_some() { "configured" } else { "missing" }
            );
            println!(
                "  Audit: {}",
                if config.audit.enabled { "enabled" } else { "disabled" }
            );

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
                println!("{}", config.to_redacted_json()?);
            }
        }
        OutputFormat::Json => {
            let parsed = if args.show_config {
                Some(serde_json::to_value(&config)?)
            } else {
                None
            };

            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "api_addr": config.api.socket_addr().to_string(),
                    "token_ttl_minutes": config.auth.token_ttl_minutes,
                    "issuer": config.auth.issuer,
                    "secret_configured": config.auth.jwt_secret.is_some(),
                    "audit_enabled": config.audit.enabled,
                },
                "warnings": warnings,
                "config": parsed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Returns non-fatal configuration problems.
fn collect_warnings(config: &CampusConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match &config.auth.jwt_secret {
        None => warnings.push(
            "No signing secret configured; `run` will fail unless --dev-mode is set".to_string(),
        ),
        Some(secret) if secret.expose().len() < 32 => {
            warnings.push("Signing secret is shorter than 32 bytes".to_string())
        }
        Some(_) => {}
    }

    if config.api.host.is_unspecified() && config.api.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("Listening on all interfaces with a wildcard CORS origin".to_string());
    }

    warnings
}
