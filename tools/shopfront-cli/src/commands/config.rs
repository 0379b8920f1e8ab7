//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    let config = &ctx.config;
    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.storage_dir().display().to_string());

    ctx.output.info("");
    ctx.output.info("[currency]");
    ctx.output.kv("base", &config.currency.base);
    if let Some(ref display) = config.currency.display {
        ctx.output.kv("display", display);
    }
    if config.currency.rates.is_empty() {
        ctx.output.kv("rates", "built-in");
    } else {
        for (code, rate) in &config.currency.rates {
            ctx.output.kv(&format!("rates.{}", code), &rate.to_string());
        }
    }

    ctx.output.info("");
    ctx.output.info("[checkout]");
    ctx.output.kv(
        "phone_min_length",
        &config.checkout.phone_min_length.to_string(),
    );
    ctx.output.kv(
        "submit_timeout_secs",
        &config.checkout.submit_timeout_secs.to_string(),
    );
    ctx.output.kv(
        "require_sign_in",
        &config.checkout.require_sign_in.to_string(),
    );
    if config.checkout.simulated_latency_ms > 0 {
        ctx.output.kv(
            "simulated_latency_ms",
            &config.checkout.simulated_latency_ms.to_string(),
        );
    }

    ctx.output.info("");
    ctx.output.info("[catalog]");
    ctx.output.kv(
        "path",
        config.catalog.path.as_deref().unwrap_or("(bundled sample)"),
    );

    ctx.output.info("");
    ctx.output.info("[auth]");
    ctx.output.kv(
        "user_id",
        config.auth.user_id.as_deref().unwrap_or("(guest)"),
    );

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", config.logging.level.as_str());
    ctx.output
        .kv("format", &format!("{:?}", config.logging.format).to_lowercase());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("shop.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut report = ctx.config.validate();

    if let Some(ref path) = ctx.config.catalog.path {
        let resolved = ctx.resolve_path(path);
        if !resolved.exists() {
            report
                .errors
                .push(format!("catalog.path '{}' does not exist", resolved.display()));
        } else if let Err(e) = ctx.catalog() {
            report.errors.push(format!("catalog.path: {:#}", e));
        }
    }

    if report.is_clean() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &report.errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &report.warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !report.errors.is_empty() {
        bail!("Configuration has {} error(s)", report.errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
