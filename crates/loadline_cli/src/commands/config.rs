use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use loadline_core::config::{self, LoadlineConfig};
use std::path::Path;

use crate::output::Output;

/// Show current configuration
pub async fn show(config: &LoadlineConfig) -> Result<()> {
    let output = Output::new();

    output.section("Current Configuration");
    println!();

    // Never echo the token itself
    let mut shown = config.clone();
    if shown.data.bearer_token.is_some() {
        shown.data.bearer_token = Some("********".to_string());
    }

    let toml_str = toml::to_string_pretty(&shown).into_diagnostic()?;
    println!("{}", toml_str);

    Ok(())
}

/// Save current configuration to file
pub async fn save(config: &LoadlineConfig, path: &Path) -> Result<()> {
    let output = Output::new();

    output.info("💾", &format!("Saving configuration to: {}", path.display()));

    config::save_config(config, path).await?;

    output.success("Configuration saved successfully!");
    println!();
    println!("To use this configuration, run:");
    println!("  {} --config {}", "loadline".bright_green(), path.display());

    Ok(())
}
