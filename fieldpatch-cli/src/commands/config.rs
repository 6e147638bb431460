use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::config::FieldpatchConfig;

pub fn run(config_override: Option<&Path>, init: bool) -> Result<()> {
    let config_path = match config_override {
        Some(path) => path.to_path_buf(),
        None => FieldpatchConfig::config_path()?,
    };

    if init {
        if config_path.exists() {
            println!("Config already exists, leaving it alone.");
        } else {
            FieldpatchConfig::create_default_config(&config_path)?;
            println!("{}", "Created default config.".green());
        }
    }

    let config = FieldpatchConfig::load(Some(&config_path))?;
    let exists = if config_path.exists() {
        String::new()
    } else {
        format!(" {}", "(not created, using defaults)".dimmed())
    };

    println!("{}", "Paths".bold());
    println!("  Config:  {}{}", config_path.display(), exists);
    println!();
    println!("{}", "Effective settings".bold());
    let rendered = toml::to_string_pretty(&config).context("Could not render config")?;
    for line in rendered.lines() {
        println!("  {}", line);
    }

    Ok(())
}
