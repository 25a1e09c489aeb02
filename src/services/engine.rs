//! Canonical record store and the license merge policy.
//!
//! ## Merge rules
//! - New item: detected license, else the source's sentinel
//!   (`unknown` for archives, `Not specified` for descriptors). Marks dirty.
//! - Known item, license detected: replace when the stored value is a
//!   sentinel or differs textually. Marks dirty on replace.
//! - Known item, nothing detected: stored license is kept.
//! - Display name and authors refresh from any non-empty fact value.
//! - `url` and `ignore` are never written here.

use crate::domain::license::{has_detected, ItemId, LicenseState};
use crate::domain::models::{AttributionEntry, CanonicalRecord, ObservedFact};
use crate::services::descriptor::PLACEHOLDER_AUTHOR;
use crate::services::license_table::LicenseTable;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub type CanonicalTable = BTreeMap<ItemId, CanonicalRecord>;
pub type ArchiveIndex = BTreeMap<ItemId, BTreeSet<PathBuf>>;

pub const PLACEHOLDER_URL: &str = "<URL>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Added(LicenseState),
    Updated { from: LicenseState, to: LicenseState },
    Kept(LicenseState),
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Added(l) => write!(f, "ADD license=\"{l}\""),
            MergeOutcome::Updated { from, to } => {
                write!(f, "UPDATE license: \"{from}\" -> \"{to}\"")
            }
            MergeOutcome::Kept(l) => write!(f, "KEEP license=\"{l}\""),
        }
    }
}

#[derive(Debug, Default)]
pub struct Reconciler {
    table: CanonicalTable,
    dirty: bool,
    archive_paths: ArchiveIndex,
}

impl Reconciler {
    pub fn new(table: CanonicalTable) -> Self {
        Self {
            table,
            dirty: false,
            archive_paths: ArchiveIndex::new(),
        }
    }

    pub fn observe(&mut self, fact: &ObservedFact) -> MergeOutcome {
        let detected = fact.detected_license.trim();
        let detected = has_detected(detected).then(|| LicenseState::from_stored(detected));

        if let Some(rec) = self.table.get_mut(&fact.item_id) {
            let outcome = match detected {
                Some(to) if rec.license.is_sentinel() || rec.license.as_str() != to.as_str() => {
                    let from = std::mem::replace(&mut rec.license, to.clone());
                    self.dirty = true;
                    MergeOutcome::Updated { from, to }
                }
                _ => MergeOutcome::Kept(rec.license.clone()),
            };
            refresh_display(rec, fact);
            return outcome;
        }

        let license = detected.unwrap_or_else(|| fact.source.absent_license());
        let mut rec = CanonicalRecord {
            license: license.clone(),
            ..CanonicalRecord::default()
        };
        refresh_display(&mut rec, fact);
        self.table.insert(fact.item_id.clone(), rec);
        self.dirty = true;
        MergeOutcome::Added(license)
    }

    /// Remembers that `id` was declared by the archive at `path`.
    pub fn record_archive(&mut self, id: &ItemId, path: &Path) {
        self.archive_paths
            .entry(id.clone())
            .or_default()
            .insert(path.to_path_buf());
    }

    /// Listing for one distribution, in the order items were first seen there.
    pub fn attribution(&self, seen: &[ItemId], licenses: &LicenseTable) -> Vec<AttributionEntry> {
        seen.iter()
            .map(|id| {
                let rec = self.table.get(id).cloned().unwrap_or_default();
                let license = rec.license.as_str().trim().to_string();
                let policy = licenses.policy(&license);
                if !policy.known {
                    debug!(modid = %id, license = %license, "unregistered license, using conservative policy");
                }
                let url = rec.url.trim().to_string();
                let credit_line = if policy.requires_attribution {
                    credit_line(id, &rec, &license)
                } else {
                    String::new()
                };
                AttributionEntry {
                    modid: id.clone(),
                    license,
                    requires_attribution: policy.requires_attribution,
                    redistribution_allowed: policy.redistribution_allowed,
                    url,
                    credit_line,
                }
            })
            .collect()
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    pub fn archive_paths(&self) -> &ArchiveIndex {
        &self.archive_paths
    }

    pub fn is_archive_sourced(&self, id: &ItemId) -> bool {
        self.archive_paths.contains_key(id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn refresh_display(rec: &mut CanonicalRecord, fact: &ObservedFact) {
    let display_name = fact.display_name.trim();
    if !display_name.is_empty() {
        rec.display_name = display_name.to_string();
    }
    let authors = fact.authors.trim();
    if !authors.is_empty() {
        rec.authors = authors.to_string();
    }
}

/// `<displayName> by <authors> (<url>) Licensed under <license>`
pub fn credit_line(id: &ItemId, rec: &CanonicalRecord, license: &str) -> String {
    let display_name = match rec.display_name.trim() {
        "" => id.as_str(),
        name => name,
    };
    let authors = match rec.authors.trim() {
        "" => PLACEHOLDER_AUTHOR,
        authors => authors,
    };
    let url = match rec.url.trim() {
        "" => PLACEHOLDER_URL,
        url => url,
    };
    format!("{display_name} by {authors} ({url}) Licensed under {license}")
}
