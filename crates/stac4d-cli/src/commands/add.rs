//! Add command implementation

use crate::batch::{BatchSummary, FileProcessingResult};
use crate::cli::AddArgs;
use crate::config_loader::{find_catalog_root, load_catalog_config_with_overrides};
use crate::dry_run::DryRunPlan;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{AddOutput, AddedItem, FailedFile, SummaryInfo};
use crate::progress::IngestProgressBar;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use stac4d_catalog::{IngestOptions, Ingestor, PcCatalog};
use stac4d_core::config::{parse_crs_fallback, CliConfigOverrides};
use stac4d_ext::DataType;
use std::path::{Path, PathBuf};

pub fn execute(args: AddArgs, output: &OutputWriter, dry_run: bool) -> Result<()> {
    if !args.path.exists() {
        return Err(errors::source_not_found(&args.path).into());
    }

    let root = find_catalog_root()?;
    let overrides = CliConfigOverrides {
        target_crs: args.target_crs.clone(),
        crs_fallback: args.crs_fallback.as_deref().map(parse_crs_fallback).transpose()?,
        ..Default::default()
    };
    let config = load_catalog_config_with_overrides(&root, overrides)?;
    let mut catalog = PcCatalog::open(&root).context("Failed to open catalog")?;

    let collection_id = args.collection.as_deref();
    if let Some(id) = collection_id {
        if catalog.collection(id).is_none() {
            return Err(errors::collection_not_found(id).into());
        }
    }

    let mut options = IngestOptions::from_config(&config)?;
    options.data_type = args.data_type.parse::<DataType>()?;
    options.datetime = args.datetime.as_deref().map(parse_datetime).transpose()?;
    options.sensor = args.sensor.clone();
    options.acquisition_mode = args.acquisition_mode.clone();
    options.timezone = args.timezone.clone();

    let ingestor = Ingestor::new();
    let files = collect_files(&ingestor, &args.path)?;

    let progress = IngestProgressBar::new(files.len(), !output.is_json());
    let results = ingestor.ingest_all_with_progress(&files, &options, |p| {
        let name = p.path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        progress.update(p.current, name);
    });

    let mut batch = BatchSummary::new(files.len());
    let mut added = Vec::new();
    let mut failed = Vec::new();

    for (path, result) in results {
        let format_name = ingestor
            .registry()
            .detect_format(&path)
            .map(|reader| reader.format_name().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Ingest errors and catalog rejections are both per-file failures
        let outcome = result.and_then(|ingested| {
            catalog.add_item(ingested.item.clone(), collection_id)?;
            Ok(ingested)
        });

        match outcome {
            Ok(ingested) => {
                if ingested.extraction.fallback_applied {
                    output.warning(format!(
                        "{}: no usable CRS, coordinates taken as geographic",
                        path.display()
                    ));
                }
                batch.add_success(FileProcessingResult::success(
                    path.clone(),
                    format_name,
                    ingested.item.id.clone(),
                ));
                added.push(AddedItem {
                    id: ingested.item.id.clone(),
                    path: path.display().to_string(),
                    datetime: ingested.item.datetime,
                    bbox: ingested.extraction.bbox.to_array(),
                    native_crs: ingested.extraction.native_crs.to_string(),
                    point_count: ingested.source.point_count,
                    crs_fallback_applied: ingested.extraction.fallback_applied,
                });
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "File not added");
                failed.push(FailedFile { path: path.display().to_string(), error: err.to_string() });
                batch.add_failure(FileProcessingResult::failure(path, format_name, err.to_string()));
            }
        }
    }
    progress.finish(batch.success_count(), batch.failure_count());

    // Headers are read and items attached in memory; only the save is skipped
    if dry_run {
        let plan = failed
            .iter()
            .fold(DryRunPlan::new(&root), |plan, f| plan.note(format!("{}: {}", f.path, f.error)));
        return plan.save_catalog(catalog.catalog()).display(output);
    }

    if batch.success_count() > 0 {
        catalog.save(&root).context("Failed to write catalog")?;
    }

    let summary = match collection_id {
        Some(id) => {
            let summary = catalog.summary(id)?;
            Some(SummaryInfo {
                item_count: summary.item_count(),
                timestamp_list: summary.timestamp_list(),
                temporal_resolution: summary.temporal_resolution(),
            })
        }
        None => None,
    };

    if output.is_json() {
        output.result(AddOutput {
            collection: args.collection.clone(),
            added,
            failed,
            summary,
        })?;
    } else {
        batch.display(output);
        if let (Some(id), Some(summary)) = (collection_id, summary) {
            output.section(format!("Collection {}", id));
            output.kv("Items", summary.item_count);
            output.kv("Temporal Resolution", format_resolution(summary.temporal_resolution));
        }
    }

    if batch.success_count() == 0 {
        bail!("No files were added");
    }
    if !batch.all_succeeded() {
        output.warning(format!("{} of {} files were not added", batch.failure_count(), batch.total_files));
    }
    Ok(())
}

/// The file itself, or the supported files directly inside a directory
fn collect_files(ingestor: &Ingestor, path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let files = ingestor
        .discover(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;
    if files.is_empty() {
        bail!(
            "No supported point-cloud files in {}. Supported extensions: {}",
            path.display(),
            ingestor.registry().supported_formats().join(", ")
        );
    }
    Ok(files)
}

/// RFC 3339 instant or a calendar date at midnight UTC
fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid datetime '{}': expected RFC 3339 or YYYY-MM-DD", input))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Human-readable mean interval
pub(crate) fn format_resolution(seconds: Option<f64>) -> String {
    match seconds {
        None => "-".to_string(),
        Some(s) if s >= 86_400.0 => format!("{:.1} days", s / 86_400.0),
        Some(s) if s >= 3_600.0 => format!("{:.1} hours", s / 3_600.0),
        Some(s) => format!("{:.0} s", s),
    }
}
