//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use inkwell_commerce::Shop;
use inkwell_db::Db;

use crate::config::{find_config_file, InkwellConfig};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Effective configuration: file, then `INKWELL_*` overrides.
    pub config: InkwellConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
}

impl Context {
    /// Load the config named on the command line, or the nearest one found
    /// walking up from the working directory.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => find_config_file(&cwd),
        };

        let mut config = match &config_path {
            Some(path) => InkwellConfig::load(path)?,
            None => InkwellConfig::default(),
        };
        config.apply_env()?;

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Database snapshot path, resolved against the working directory.
    pub fn database_path(&self) -> PathBuf {
        resolve(&self.cwd, &self.config.database.path)
    }

    /// Open the shop over the configured database file.
    pub fn open_shop(&self) -> Result<Shop> {
        let path = self.database_path();
        let db = Db::open(&path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        self.output
            .debug(&format!("Opened database {}", path.display()));
        Ok(Shop::new(Arc::new(db), self.config.shop.clone()))
    }
}

fn resolve(cwd: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
