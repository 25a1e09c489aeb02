//! One distribution's pass: enumerate artifacts, feed facts to the
//! reconciler, write the local attribution outputs.

use crate::config::Layout;
use crate::domain::license::ItemId;
use crate::domain::models::{AttributionEntry, ObservedFact, SourceKind};
use crate::services::archive::ArchiveScanner;
use crate::services::descriptor::read_link_descriptor;
use crate::services::engine::Reconciler;
use crate::services::manifest::{extract_manifest_fields, ManifestFields};
use crate::services::storage::write_attribution;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub descriptors: Vec<PathBuf>,
    pub archives: Vec<PathBuf>,
}

/// Lists the mods directory and each bucket below it. Paths are sorted
/// within each directory; unreadable directories are skipped.
pub fn enumerate_artifacts(mods_dir: &Path, layout: &Layout) -> Artifacts {
    let mut out = Artifacts::default();
    let dirs = std::iter::once(mods_dir.to_path_buf())
        .chain(layout.buckets.iter().map(|b| mods_dir.join(b)));
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        let mut files: Vec<PathBuf> = match std::fs::read_dir(&dir) {
            Ok(rd) => rd.filter_map(|e| e.ok().map(|e| e.path())).collect(),
            Err(e) => {
                warn!(dir = %dir.display(), "cannot list directory: {e}");
                continue;
            }
        };
        files.sort();
        for path in files {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
                continue;
            };
            if name.ends_with(&layout.descriptor_suffix.to_lowercase()) {
                out.descriptors.push(path);
            } else if name.ends_with(&layout.archive_ext.to_lowercase()) {
                out.archives.push(path);
            }
        }
    }
    out
}

/// Feeds every artifact of one distribution into `reconciler`, descriptors
/// first. Returns item ids in first-seen order.
pub fn reconcile_distribution(
    artifacts: &Artifacts,
    layout: &Layout,
    scanner: &mut ArchiveScanner,
    reconciler: &mut Reconciler,
) -> Vec<ItemId> {
    let mut seen = SeenOrder::default();

    for path in &artifacts.descriptors {
        let facts = match read_link_descriptor(path, &layout.archive_ext) {
            Ok(facts) => facts,
            Err(e) => {
                warn!("SKIP: {e}");
                continue;
            }
        };
        let item_id = ItemId::new(&facts.item_id);
        if item_id.is_empty() {
            warn!(path = %path.display(), "SKIP: descriptor yields no item id");
            continue;
        }
        let outcome = reconciler.observe(&ObservedFact {
            item_id: item_id.clone(),
            detected_license: facts.license,
            display_name: facts.display_name,
            authors: facts.authors,
            source: SourceKind::LinkDescriptor,
        });
        info!(modid = %item_id, source = "link", "{outcome}");
        seen.push(item_id);
    }

    for path in &artifacts.archives {
        for fields in archive_fields(scanner, path) {
            let item_id = ItemId::new(fields.item_id());
            reconciler.record_archive(&item_id, path);
            let outcome = reconciler.observe(&ObservedFact {
                item_id: item_id.clone(),
                detected_license: fields.license().to_string(),
                display_name: fields.display_name,
                authors: fields.authors,
                source: SourceKind::Archive,
            });
            info!(modid = %item_id, source = "jar", "{outcome}");
            seen.push(item_id);
        }
    }

    seen.into_vec()
}

/// Fields of every manifest in the archive that declares an item id, in
/// entry order. Nested jar-in-jar manifests count as separate items.
fn archive_fields(scanner: &mut ArchiveScanner, path: &Path) -> Vec<ManifestFields> {
    let manifests = scanner.manifests(path);
    if manifests.is_empty() {
        warn!(archive = %path.display(), "SKIP: no manifest found");
        return Vec::new();
    }
    let mut out = Vec::new();
    for m in manifests {
        let fields = extract_manifest_fields(&m.text);
        if fields.item_id().trim().is_empty() {
            warn!(archive = %path.display(), entry = %m.name, "SKIP: manifest declares no modId");
            continue;
        }
        debug!(archive = %path.display(), entry = %m.name, modid = fields.item_id(), "manifest read");
        out.push(fields);
    }
    out
}

#[derive(Default)]
struct SeenOrder {
    order: Vec<ItemId>,
    set: HashSet<ItemId>,
}

impl SeenOrder {
    fn push(&mut self, id: ItemId) {
        if self.set.insert(id.clone()) {
            self.order.push(id);
        }
    }

    fn into_vec(self) -> Vec<ItemId> {
        self.order
    }
}

/// Credit lines of entries that require attribution, in listing order.
pub fn credit_lines(entries: &[AttributionEntry]) -> Vec<&str> {
    entries
        .iter()
        .filter(|e| e.requires_attribution && !e.credit_line.is_empty())
        .map(|e| e.credit_line.as_str())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub license_file: PathBuf,
    pub credit_file: Option<PathBuf>,
}

/// Overwrites `license.json` and writes `credit.txt` only when some credit
/// is required. A leftover `credit.txt` is removed otherwise.
pub fn write_outputs(
    dist_dir: &Path,
    layout: &Layout,
    entries: &[AttributionEntry],
) -> anyhow::Result<WrittenOutputs> {
    let license_file = dist_dir.join(&layout.attribution_file);
    write_attribution(&license_file, entries)?;
    info!(path = %license_file.display(), items = entries.len(), "attribution written");

    let credit_path = dist_dir.join(&layout.credit_file);
    let credits = credit_lines(entries);
    let credit_file = if credits.is_empty() {
        if credit_path.exists() {
            std::fs::remove_file(&credit_path)?;
            info!(path = %credit_path.display(), "stale credit file removed");
        }
        None
    } else {
        std::fs::write(&credit_path, credits.join("\n"))?;
        info!(path = %credit_path.display(), credits = credits.len(), "credit file written");
        Some(credit_path)
    };

    Ok(WrittenOutputs {
        license_file,
        credit_file,
    })
}
