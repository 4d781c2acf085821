//! Collection command implementation

use crate::cli::CollectionArgs;
use crate::config_loader::{find_catalog_root, load_catalog_config};
use crate::dry_run::DryRunPlan;
use crate::output::OutputWriter;
use crate::output_types::CollectionOutput;
use anyhow::{Context, Result};
use stac4d_catalog::{create_collection, PcCatalog};
use stac4d_store::fs::COLLECTION_FILE;

pub fn execute(args: CollectionArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    let root = find_catalog_root()?;
    let config = load_catalog_config(&root)?;
    let mut catalog = PcCatalog::open(&root).context("Failed to open catalog")?;

    let license = args.license.unwrap_or(config.license.value);
    let collection = create_collection(&args.id, &args.title, &args.description, None, None, &license);

    // Validates the id against the catalog before anything is written
    catalog.add_collection(collection, None)?;

    let relative_path = format!("{}/{}", args.id, COLLECTION_FILE);

    if dry_run {
        return DryRunPlan::new(&root).save_catalog(catalog.catalog()).display(output);
    }

    catalog.save(&root).context("Failed to write catalog")?;
    tracing::info!(collection = %args.id, "Added collection");

    if output.is_json() {
        output.result(CollectionOutput {
            id: args.id,
            title: args.title,
            license,
            path: relative_path,
        })?;
    } else {
        output.success(format!("Added collection: {}", args.id));
        output.kv("Title", &args.title);
        output.kv("License", &license);
        output.kv("Path", &relative_path);
    }

    Ok(())
}
