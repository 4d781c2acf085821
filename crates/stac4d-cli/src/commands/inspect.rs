//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::config_loader::{find_catalog_root_from, load_catalog_config};
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::InspectOutput;
use anyhow::{Context, Result};
use stac4d_catalog::ingest::item_id;
use stac4d_core::config::LayeredConfig;
use stac4d_core::formats::ReaderRegistry;
use stac4d_core::temporal::extract_acquisition_date;
use stac4d_geo::{extract_bbox, BboxOptions};

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    if !args.path.is_file() {
        return Err(errors::source_not_found(&args.path).into());
    }

    // Catalog settings apply when run inside one, defaults otherwise
    let current = std::env::current_dir()?;
    let config = match find_catalog_root_from(&current) {
        Some(root) => load_catalog_config(&root)?,
        None => LayeredConfig::with_defaults().load_from_env(),
    };

    let registry = ReaderRegistry::with_defaults();
    let reader = registry.detect_format(&args.path)?;
    let source = reader
        .read(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let options = BboxOptions::from_config(&config)?;
    let extraction = extract_bbox(&source.extent, source.crs.as_deref(), &options)?;
    let date = extract_acquisition_date(&args.path);
    let id = item_id(&args.path)?;

    let report = InspectOutput {
        path: args.path.display().to_string(),
        format: reader.format_name().to_string(),
        version: source.version.clone(),
        point_count: source.point_count,
        native_crs: extraction.native_crs.to_string(),
        source_epsg: extraction.source_epsg,
        native_bbox: [
            source.extent.min[0],
            source.extent.min[1],
            source.extent.max[0],
            source.extent.max[1],
        ],
        z_range: source.z_range,
        bbox: extraction.bbox.to_array(),
        target_crs: options.target.definition().to_string(),
        crs_fallback_applied: extraction.fallback_applied,
        acquisition_date: date.map(|d| d.format("%Y-%m-%d").to_string()),
        item_id: id,
    };

    if output.is_json() {
        return output.result(report);
    }

    output.section(format!("{} ({})", report.path, report.format));
    if let Some(version) = &report.version {
        output.kv("Version", version);
    }
    output.kv("Points", report.point_count);
    output.kv("Item Id", &report.item_id);
    output.kv("Acquisition Date", report.acquisition_date.as_deref().unwrap_or("unknown"));

    output.section("Native");
    output.kv("CRS", &report.native_crs);
    output.kv("Extent", format_bbox(&report.native_bbox));
    output.kv("Z Range", format!("{:.3} .. {:.3}", report.z_range[0], report.z_range[1]));

    output.section(format!("Geographic ({})", report.target_crs));
    output.kv("Bbox", format_bbox(&report.bbox));
    if report.crs_fallback_applied {
        output.warning("No usable CRS in the file; native coordinates were taken as geographic");
    }

    Ok(())
}

fn format_bbox(bbox: &[f64; 4]) -> String {
    format!("[{:.6}, {:.6}, {:.6}, {:.6}]", bbox[0], bbox[1], bbox[2], bbox[3])
}
