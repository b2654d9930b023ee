//! Handler for the `config` command group.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::application::StaleValuePolicy;
use crate::infrastructure::config::Config;

/// Render a unit enum the way it is written in the config file.
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(other) => other.to_string(),
        Err(_) => "?".to_string(),
    }
}

/// Execute `config show`.
pub fn execute_show(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "path": path.map(|p| p.display().to_string()),
            "config": config,
        }));
        return Ok(());
    }

    let policy = config.resolution_policy();

    output::section("Effective Configuration");
    output::field(
        "Source",
        path.map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string()),
    );

    output::section("Engine");
    output::field("Fee", format!("{} bp", config.engine.fee_bps));

    output::section("Resolution");
    output::field("Tie break", label(&policy.tie_break));
    output::field("Empty winners", label(&policy.empty_winning_side));
    match policy.stale_value {
        StaleValuePolicy::Fail => output::field("Stale value", "fail"),
        StaleValuePolicy::Void { grace_secs } => {
            output::field("Stale value", format!("void after {grace_secs}s"));
        }
    }
    match policy.max_confidence_bps {
        Some(max_bps) => output::field("Max confidence", format!("{max_bps} bp")),
        None => output::field("Max confidence", "unbounded"),
    }

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

/// Execute `config validate`.
///
/// # Errors
///
/// Fails when no file was given or the file does not load.
pub fn execute_validate(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.context("config validate needs --config <PATH>")?;
    Config::load(path).with_context(|| format!("invalid config {}", path.display()))?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
        }));
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", path.display());
    output::success("Config file is valid");
    Ok(())
}
