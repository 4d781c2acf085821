use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// stac4d - STAC catalogs for multi-temporal point-cloud acquisitions
#[derive(Parser, Debug)]
#[command(name = "stac4d")]
#[command(about = "Spatio-temporal STAC catalogs for point clouds", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new catalog
    Init(InitArgs),

    /// Add a collection to the catalog
    Collection(CollectionArgs),

    /// Ingest point-cloud files as catalog items
    Add(AddArgs),

    /// Show header metadata and bounding box of a point-cloud file
    Inspect(InspectArgs),

    /// Show catalog status and collection summaries
    Status(StatusArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Catalog directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Catalog id
    #[arg(long)]
    pub id: String,

    /// Catalog title
    #[arg(long)]
    pub title: String,

    /// Catalog description
    #[arg(long)]
    pub description: String,

    /// Overwrite an existing catalog
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct CollectionArgs {
    /// Collection id
    pub id: String,

    /// Collection title
    #[arg(long)]
    pub title: String,

    /// Collection description
    #[arg(long)]
    pub description: String,

    /// SPDX license identifier (defaults to the configured license)
    #[arg(long)]
    pub license: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Point-cloud file (LAS, LAZ, COPC) or a directory of them
    pub path: PathBuf,

    /// Target collection; items are attached to the catalog root when omitted
    #[arg(long, short = 'c')]
    pub collection: Option<String>,

    /// Sensor name recorded as topo4d:sensor
    #[arg(long)]
    pub sensor: Option<String>,

    /// Acquisition mode recorded as topo4d:acquisition_mode (e.g. ULS, TLS)
    #[arg(long)]
    pub acquisition_mode: Option<String>,

    /// Data type (point-cloud, mesh, raster, vector, text, other)
    #[arg(long, default_value = "point-cloud")]
    pub data_type: String,

    /// Acquisition datetime (RFC 3339 or YYYY-MM-DD); defaults to the date in the file name
    #[arg(long)]
    pub datetime: Option<String>,

    /// IANA timezone of the acquisition recorded as topo4d:tz
    #[arg(long)]
    pub timezone: Option<String>,

    /// Target CRS for item bounding boxes
    #[arg(long)]
    pub target_crs: Option<String>,

    /// What to do with files without a usable CRS (geographic or reject)
    #[arg(long, value_name = "POLICY")]
    pub crs_fallback: Option<String>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Point-cloud file to inspect
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Show only the effective configuration
    #[arg(long)]
    pub config: bool,
}
