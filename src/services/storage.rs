use crate::config::Layout;
use crate::domain::models::{AttributionEntry, CanonicalRow, LicenseAttribute};
use crate::error::SetupError;
use crate::services::engine::CanonicalTable;
use crate::services::license_table::LicenseTable;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Resolved locations of the two tables for one run.
#[derive(Debug, Clone)]
pub struct TablePaths {
    pub license_table: Option<PathBuf>,
    pub license_candidates: Vec<PathBuf>,
    /// Where the canonical table is read from and written back to.
    pub canonical_table: PathBuf,
}

impl TablePaths {
    pub fn resolve(root: &Path, layout: &Layout) -> Self {
        let candidates = |file: &str| -> Vec<PathBuf> {
            layout
                .table_dirs
                .iter()
                .map(|d| root.join(d).join(file))
                .collect()
        };
        let license_candidates = candidates(&layout.license_table);
        let canonical_candidates = candidates(&layout.canonical_table);

        let license_table = license_candidates.iter().find(|p| p.exists()).cloned();
        let canonical_table = canonical_candidates
            .iter()
            .find(|p| p.exists())
            .or(canonical_candidates.last())
            .cloned()
            .unwrap_or_else(|| root.join(&layout.canonical_table));

        Self {
            license_table,
            license_candidates,
            canonical_table,
        }
    }
}

pub fn load_license_table(paths: &TablePaths) -> anyhow::Result<LicenseTable> {
    let Some(path) = &paths.license_table else {
        let looked: Vec<String> = paths
            .license_candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        return Err(SetupError::MissingLicenseTable(looked.join(", ")).into());
    };
    let rows: Vec<LicenseAttribute> = read_json(path)?;
    let table = LicenseTable::from_rows(rows);
    info!(path = %path.display(), licenses = table.len(), "loaded license attribute table");
    if table.is_empty() {
        warn!("license attribute table is empty; every license is treated as unregistered");
    }
    Ok(table)
}

/// A missing canonical table is an empty one; an unparsable one is fatal.
pub fn load_canonical_table(path: &Path) -> anyhow::Result<CanonicalTable> {
    if !path.exists() {
        info!(path = %path.display(), "no canonical table yet, starting empty");
        return Ok(CanonicalTable::new());
    }
    let rows: Vec<CanonicalRow> = read_json(path)?;
    let mut table = CanonicalTable::new();
    for row in rows {
        let (id, rec) = row.into_parts();
        if id.is_empty() {
            warn!(path = %path.display(), "dropping canonical row without modid");
            continue;
        }
        table.insert(id, rec);
    }
    info!(path = %path.display(), items = table.len(), "loaded canonical table");
    Ok(table)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bad = |reason: String| SetupError::BadTable {
        path: path.to_path_buf(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| bad(e.to_string()))?;
    Ok(serde_json::from_str(&raw).map_err(|e| bad(e.to_string()))?)
}

/// Writes the whole table sorted by modid.
pub fn save_canonical_table(path: &Path, table: &CanonicalTable) -> anyhow::Result<()> {
    let rows: Vec<CanonicalRow> = table
        .iter()
        .map(|(id, rec)| CanonicalRow::from_parts(id, rec))
        .collect();
    write_json(path, &rows)?;
    info!(path = %path.display(), items = rows.len(), "canonical table updated");
    Ok(())
}

pub fn write_attribution(path: &Path, entries: &[AttributionEntry]) -> anyhow::Result<()> {
    write_json(path, entries)
}

/// Pretty JSON with 4-space indentation.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    std::fs::write(path, buf)?;
    Ok(())
}

/// Best-effort copies of both tables for the static front-end. Failures are
/// warnings only.
pub fn publish_tables(paths: &TablePaths, publish_dir: &Path) -> Vec<PathBuf> {
    let mut published = Vec::new();
    let sources = [
        Some(paths.canonical_table.as_path()),
        paths.license_table.as_deref(),
    ];
    for src in sources.into_iter().flatten() {
        if !src.exists() {
            continue;
        }
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = publish_dir.join(name);
        let copied = std::fs::create_dir_all(publish_dir).and_then(|_| std::fs::copy(src, &dest));
        match copied {
            Ok(_) => {
                info!(from = %src.display(), to = %dest.display(), "published");
                published.push(dest);
            }
            Err(e) => warn!(from = %src.display(), "publish copy failed: {e}"),
        }
    }
    if published.is_empty() {
        warn!("nothing to publish: neither table exists");
    }
    published
}
