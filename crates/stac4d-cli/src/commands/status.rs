//! Status command implementation

use super::add::format_resolution;
use crate::cli::StatusArgs;
use crate::config_loader::{find_catalog_root, load_catalog_config};
use crate::output::OutputWriter;
use crate::output_types::{CollectionRow, ConfigRow, StatusOutput};
use anyhow::{Context, Result};
use stac4d_catalog::{CollectionSummary, PcCatalog};
use stac4d_core::config::LayeredConfig;

pub fn execute(args: StatusArgs, output: &OutputWriter) -> Result<()> {
    let root = find_catalog_root()?;
    let config = load_catalog_config(&root)?;

    if args.config {
        return output.table(config_rows(&config));
    }

    let catalog = PcCatalog::open(&root).context("Failed to open catalog")?;
    let collections = catalog
        .collections()
        .iter()
        .map(|collection| Ok(collection_row(&collection.id, &catalog.summary(&collection.id)?)))
        .collect::<Result<Vec<_>>>()?;

    if output.is_json() {
        return output.result(StatusOutput {
            catalog_path: root.display().to_string(),
            id: catalog.id().to_string(),
            title: catalog.catalog().title.clone(),
            root_items: catalog.root_items().len(),
            collections,
        });
    }

    output.section("Catalog Status");
    output.kv("Location", root.display());
    output.kv("Id", catalog.id());
    if let Some(title) = &catalog.catalog().title {
        output.kv("Title", title);
    }
    output.kv("Collections", collections.len());
    output.kv("Root Items", catalog.root_items().len());

    output.section("Collections");
    output.table(collections)?;

    Ok(())
}

fn collection_row(id: &str, summary: &CollectionSummary) -> CollectionRow {
    let timestamps = summary.timestamps();
    let day = |index: Option<usize>| {
        index
            .and_then(|i| timestamps.get(i))
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    CollectionRow {
        id: id.to_string(),
        item_count: summary.item_count(),
        first: day(Some(0)),
        last: day(timestamps.len().checked_sub(1)),
        temporal_resolution: format_resolution(summary.temporal_resolution()),
    }
}

fn config_rows(config: &LayeredConfig) -> Vec<ConfigRow> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}
