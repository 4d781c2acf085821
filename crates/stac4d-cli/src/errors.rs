use console::style;
use stac4d_core::Stac4dError;
use std::fmt;
use std::path::Path;

/// Error with remediation hints for the terminal
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn catalog_not_found() -> CliError {
    let current_dir = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    CliError::new("Not in a stac4d catalog")
        .with_context(format!(
            "No catalog root was found here or in any parent directory.\n\nCurrent directory: {}\nLooking for: .stac4d directory",
            current_dir
        ))
        .with_suggestion("Initialize a catalog: stac4d init <dir> --id <id> --title <title> --description <text>")
        .with_suggestion("Or navigate to an existing catalog")
        .with_help("Run: stac4d init --help")
}

pub fn catalog_exists(path: &Path) -> CliError {
    CliError::new("Catalog already exists")
        .with_context(format!("A catalog is already initialized at {}", path.display()))
        .with_suggestion("Use --force to overwrite it")
        .with_suggestion("Or choose a different directory")
        .with_help("Run: stac4d init --help")
}

pub fn source_not_found(path: &Path) -> CliError {
    CliError::new("Point-cloud file not found")
        .with_context(format!("The specified path does not exist.\n\nPath: {}", path.display()))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Use absolute path or path relative to current directory")
        .with_help("Run: stac4d add --help")
}

pub fn collection_not_found(id: &str) -> CliError {
    CliError::new(format!("Collection '{}' not found", id))
        .with_context("Items can only be attached to collections that exist in the catalog.")
        .with_suggestion(format!(
            "Create it: stac4d collection {} --title <title> --description <text>",
            id
        ))
        .with_suggestion("List collections: stac4d status")
        .with_help("Run: stac4d collection --help")
}

pub fn invalid_crs(input: &str) -> CliError {
    CliError::new("Invalid CRS")
        .with_context(format!("'{}' does not resolve to a coordinate reference system.", input))
        .with_suggestion("Use an authority code such as EPSG:25832 or a WKT definition")
        .with_suggestion("Or pass --crs-fallback geographic to treat coordinates as lon/lat")
        .with_help("Run: stac4d add --help")
}

pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check .stac4d/config.toml for syntax errors")
        .with_suggestion("Or reinitialize: stac4d init --force")
        .with_help("Run: stac4d status --config")
}

/// Map an error to a `CliError`, with hints for the library errors users can fix
pub fn from_anyhow(error: &anyhow::Error) -> CliError {
    if let Some(err) = error.downcast_ref::<Stac4dError>() {
        return match err {
            Stac4dError::CollectionNotFound { id } => collection_not_found(id),
            Stac4dError::InvalidCrs { input } => invalid_crs(input),
            Stac4dError::ConfigInvalid { key, reason } => invalid_config(key, reason),
            Stac4dError::DuplicateCollection { id } => {
                CliError::new(format!("Collection '{}' already exists", id))
                    .with_suggestion("Choose a different collection id")
                    .with_help("Run: stac4d status")
            }
            Stac4dError::DuplicateItem { id } => {
                CliError::new(format!("Item '{}' already exists", id))
                    .with_context("Item ids are derived from the file name up to its first '.'.")
                    .with_suggestion("Rename the file or add it to another collection")
            }
            Stac4dError::InvalidId { id, reason } => {
                CliError::new(format!("Invalid id '{}'", id))
                    .with_context(format!("Ids name directories in the saved catalog: {}.", reason))
                    .with_suggestion("Use letters, digits, '-' and '_'")
            }
            other => CliError::new(other.to_string()),
        };
    }

    let message = format!("{:#}", error);
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.to_lowercase().contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
            .with_suggestion("Or run with appropriate privileges")
    } else {
        CliError::new(message)
    }
}
