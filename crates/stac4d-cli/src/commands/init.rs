//! Init command implementation

use crate::cli::InitArgs;
use crate::config_loader::{config_path, CONFIG_FILE, STATE_DIR};
use crate::dry_run::DryRunPlan;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::InitOutput;
use anyhow::{Context, Result};
use stac4d_catalog::PcCatalog;
use stac4d_core::config::LayeredConfig;
use std::fs;
use std::path::Path;

pub fn execute(args: InitArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    let state_dir = args.path.join(STATE_DIR);
    if state_dir.exists() && !args.force {
        return Err(errors::catalog_exists(&args.path).into());
    }

    let catalog = PcCatalog::create(&args.id, &args.title, &args.description)?;
    let defaults = LayeredConfig::with_defaults();

    if dry_run {
        return DryRunPlan::new(&args.path)
            .write("config", &args.id, &Path::new(STATE_DIR).join(CONFIG_FILE))
            .save_catalog(catalog.catalog())
            .display(output);
    }

    fs::create_dir_all(&state_dir)
        .with_context(|| format!("Failed to create {}", state_dir.display()))?;
    fs::write(config_path(&args.path), config_template(&defaults))
        .context("Failed to write config.toml")?;
    catalog.save(&args.path).context("Failed to write catalog")?;

    tracing::info!(catalog = %args.id, path = %args.path.display(), "Initialized catalog");

    if output.is_json() {
        output.result(InitOutput {
            catalog_path: args.path.display().to_string(),
            id: args.id,
            title: args.title,
        })?;
    } else {
        output.success(format!("Initialized catalog at {}", args.path.display()));
        output.section("Catalog");
        output.kv("Id", &args.id);
        output.kv("Title", &args.title);
        output.section("Configuration");
        output.kv("Target CRS", &defaults.target_crs.value);
        output.kv("CRS fallback", format!("{:?}", defaults.crs_fallback.value));
        output.kv("License", &defaults.license.value);
    }

    Ok(())
}

fn config_template(config: &LayeredConfig) -> String {
    format!(
        r#"# stac4d catalog configuration

# CRS of item bounding boxes
target_crs = "{}"

# Files without a usable CRS: "Geographic" (treat as lon/lat) or "Reject"
crs_fallback = "{:?}"

# License of new collections (SPDX identifier)
license = "{}"

# Media type of point-cloud assets
asset_media_type = "{}"
"#,
        config.target_crs.value,
        config.crs_fallback.value,
        config.license.value,
        config.asset_media_type.value,
    )
}
