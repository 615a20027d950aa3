//! Catalog snapshots: JSON captures of a schema's catalog rows, planned
//! offline without a database connection.
//!
//! ```json
//! {"schema": "app", "objects": [{"name": "v1", "kind": "view"}]}
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::CatalogReader;
use crate::error::{Error, Result};
use crate::objects::{CatalogRow, SchemaRef};
use crate::planner::CleanupPlanner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub schema: String,
    #[serde(default)]
    pub objects: Vec<CatalogRow>,
}

impl SchemaSnapshot {
    pub fn schema_ref(&self) -> SchemaRef {
        SchemaRef::new(&self.schema)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| Error::Snapshot {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Every `*.json` file under `path`, sorted by path.
pub fn snapshot_files(path: &Path) -> Result<Vec<PathBuf>> {
    let glob = OverrideBuilder::new(path).add("**/*.json")?.build()?;
    let walker = WalkBuilder::new(path).overrides(glob).build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().map_or(true, |t| t.is_dir()) {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    Ok(files)
}

/// Loads every snapshot under `path`.
pub fn load_snapshots(path: &Path) -> Result<Vec<SchemaSnapshot>> {
    let files = snapshot_files(path)?;
    let mut snapshots = Vec::with_capacity(files.len());
    for file in files {
        debug!(file = %file.display(), "loading snapshot");
        snapshots.push(SchemaSnapshot::from_file(&file)?);
    }
    info!(path = %path.display(), snapshots = snapshots.len(), "loaded catalog snapshots");
    Ok(snapshots)
}

/// Serves catalog rows from snapshots. A schema with several snapshots keeps
/// the last one loaded.
#[derive(Debug, Default, Clone)]
pub struct SnapshotCatalog {
    schemas: HashMap<String, Vec<CatalogRow>>,
}

impl SnapshotCatalog {
    pub fn new(snapshots: impl IntoIterator<Item = SchemaSnapshot>) -> Self {
        let schemas = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.schema, snapshot.objects))
            .collect();
        Self { schemas }
    }
}

impl CatalogReader for SnapshotCatalog {
    fn fetch_objects(&mut self, schema: &SchemaRef) -> Result<Vec<CatalogRow>> {
        match self.schemas.get(schema.name()) {
            Some(rows) => Ok(rows.clone()),
            None => Err(Error::catalog_unavailable(
                schema.name(),
                "no snapshot for schema",
            )),
        }
    }
}

/// Plans every requested schema from the snapshots under `path` and writes
/// the result as SQL: a `-- schema <name>` line, then one `;`-terminated
/// statement per line. With no `schemas`, every snapshot's schema is planned
/// once, in load order.
pub fn write_plans<W: Write>(
    path: &Path,
    schemas: &[String],
    retain: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let mut planner = CleanupPlanner::redshift();
    if let Some(pattern) = retain {
        planner = planner.with_retain(Regex::new(pattern)?);
    }

    let snapshots = load_snapshots(path)?;
    let mut names = schemas.to_vec();
    if names.is_empty() {
        for snapshot in &snapshots {
            if !names.contains(&snapshot.schema) {
                names.push(snapshot.schema.clone());
            }
        }
    }

    let mut catalog = SnapshotCatalog::new(snapshots);
    for name in names {
        let schema = SchemaRef::new(name);
        let rows = catalog.fetch_objects(&schema)?;
        let plan = planner.plan(&schema, rows)?;
        info!(schema = %schema, statements = plan.len(), "planned");

        writeln!(out, "-- schema {}", schema)?;
        for statement in &plan {
            writeln!(out, "{};", statement)?;
        }
    }
    Ok(())
}
