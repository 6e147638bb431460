//! Global fieldpatch configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use fieldpatch_core::ics::{DEFAULT_FOLD_WIDTH, GenerateOptions, LineEnding, MIN_FOLD_WIDTH};
use serde::{Deserialize, Serialize};

fn default_fold() -> bool {
    true
}

fn default_fold_width() -> usize {
    DEFAULT_FOLD_WIDTH
}

/// Configuration at ~/.config/fieldpatch/config.toml, overridable with
/// `FIELDPATCH_*` environment variables (e.g. `FIELDPATCH_LINE_ENDING=lf`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FieldpatchConfig {
    #[serde(default)]
    pub line_ending: LineEnding,

    #[serde(default = "default_fold")]
    pub fold: bool,

    #[serde(default = "default_fold_width")]
    pub fold_width: usize,
}

impl Default for FieldpatchConfig {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::default(),
            fold: default_fold(),
            fold_width: default_fold_width(),
        }
    }
}

impl FieldpatchConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("fieldpatch");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let config: FieldpatchConfig = Config::builder()
            .add_source(File::from(path.clone()).required(false))
            .add_source(Environment::with_prefix("FIELDPATCH"))
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        if config.fold_width < MIN_FOLD_WIDTH {
            anyhow::bail!(
                "fold_width must be at least {} (got {})",
                MIN_FOLD_WIDTH,
                config.fold_width
            );
        }

        Ok(config)
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            line_ending: self.line_ending,
            fold_width: self.fold.then_some(self.fold_width),
        }
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# fieldpatch configuration

# Line ending of written records (\"crlf\" or \"lf\"):
# line_ending = \"crlf\"

# Fold long lines, and at how many octets:
# fold = true
# fold_width = {}
",
            DEFAULT_FOLD_WIDTH
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Could not create config directory")?;
        }

        std::fs::write(path, contents).context("Could not write config file")?;

        Ok(())
    }
}
