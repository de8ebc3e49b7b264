//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{find_config_file, generate_default_config, InkwellConfig, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

const SECTIONS: [(&str, &[&str]); 5] = [
    ("server", &["host", "port", "cors_origins"]),
    ("database", &["path"]),
    (
        "carrier",
        &["api_url", "api_key", "timeout_secs", "limit", "min_query_len"],
    ),
    (
        "shop",
        &[
            "currency",
            "self_pickup_delivery_id",
            "discount_precedence",
            "max_count_per_line",
            "recently_viewed_limit",
        ],
    ),
    ("logging", &["level", "format", "access_log"]),
];

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    for (section, keys) in SECTIONS {
        ctx.output.info("");
        ctx.output.info(&format!("[{section}]"));
        for key in keys {
            let mut value = ctx.config.get(&format!("{section}.{key}"))?;
            if *key == "api_key" && !value.is_empty() {
                value = "********".to_string();
            }
            ctx.output.kv(key, &value);
        }
    }

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = ctx.config.get(key)?;

    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Writes to the file on disk, not the env-overridden effective config.
fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let Some(path) = ctx
        .config_path
        .clone()
        .or_else(|| find_config_file(&ctx.cwd))
    else {
        bail!("No config file found. Run `inkwell config init` to create one.");
    };

    let mut config = InkwellConfig::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

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

    let (errors, warnings) = ctx.config.validate();

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
