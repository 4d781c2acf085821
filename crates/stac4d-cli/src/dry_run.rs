//! Dry-run previews of what a save would write

use crate::output::OutputWriter;
use serde::Serialize;
use stac4d_core::models::Catalog;
use stac4d_store::fs::{document_paths, DocumentKind};
use std::path::{Path, PathBuf};
use tabled::Tabled;

/// Whether a planned write creates a new file or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Create,
    Update,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Create => write!(f, "create"),
            Change::Update => write!(f, "update"),
        }
    }
}

/// One file a command would write, relative to the catalog root
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PlannedWrite {
    #[tabled(rename = "Change")]
    pub change: Change,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Path")]
    pub path: String,
}

/// Files a command would write under a catalog root, plus notes on skipped input
#[derive(Debug, Clone, Serialize)]
pub struct DryRunPlan {
    pub catalog_root: PathBuf,
    pub planned_writes: Vec<PlannedWrite>,
    pub notes: Vec<String>,
}

impl DryRunPlan {
    pub fn new(catalog_root: &Path) -> Self {
        Self {
            catalog_root: catalog_root.to_path_buf(),
            planned_writes: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Plan a write of `relative` under the root, created or updated depending on what is on disk
    pub fn write(mut self, kind: impl Into<String>, id: impl Into<String>, relative: &Path) -> Self {
        let change = if self.catalog_root.join(relative).exists() {
            Change::Update
        } else {
            Change::Create
        };
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        self.planned_writes.push(PlannedWrite { change, kind: kind.into(), id: id.into(), path });
        self
    }

    /// Plan every document saving `catalog` would write
    pub fn save_catalog(self, catalog: &Catalog) -> Self {
        document_paths(catalog).into_iter().fold(self, |plan, document| {
            let kind = match document.kind {
                DocumentKind::Catalog => "catalog",
                DocumentKind::Collection => "collection",
                DocumentKind::Item => "item",
            };
            plan.write(kind, document.id, &document.path)
        })
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn count(&self, change: Change) -> usize {
        self.planned_writes.iter().filter(|w| w.change == change).count()
    }

    pub fn display(self, output: &OutputWriter) -> anyhow::Result<()> {
        if output.is_json() {
            return output.result(serde_json::json!({ "dry_run": true, "plan": self }));
        }

        output.section(format!("Planned Writes in {} (Dry Run)", self.catalog_root.display()));
        let created = self.count(Change::Create);
        let updated = self.count(Change::Update);
        output.table(self.planned_writes)?;
        output.kv("New files", created);
        output.kv("Rewritten files", updated);
        for note in &self.notes {
            output.warning(note);
        }
        output.info("No changes were made. Run without --dry-run to write these files.");
        Ok(())
    }
}
