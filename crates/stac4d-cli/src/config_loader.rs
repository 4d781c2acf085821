//! Catalog root discovery and configuration loading

use anyhow::{Context, Result};
use stac4d_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::errors;

/// Directory marking a catalog root
pub const STATE_DIR: &str = ".stac4d";
pub const CONFIG_FILE: &str = "config.toml";

/// Path of the configuration file of the catalog rooted at `root`
pub fn config_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(CONFIG_FILE)
}

/// Load layered configuration for a catalog; a missing file leaves defaults in place
pub fn load_catalog_config(root: &Path) -> Result<LayeredConfig> {
    let path = config_path(root);
    let mut config = LayeredConfig::with_defaults();

    if path.is_file() {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    } else {
        tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_catalog_config_with_overrides(
    root: &Path,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_catalog_config(root)?;
    config.update_from_cli(overrides);
    Ok(config)
}

/// Find the catalog root by walking up from `start` to a directory holding `.stac4d`
pub fn find_catalog_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(STATE_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Find the catalog root above the current directory
pub fn find_catalog_root() -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    find_catalog_root_from(&current).ok_or_else(|| errors::catalog_not_found().into())
}
