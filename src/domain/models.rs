use crate::domain::license::{ItemId, LicenseState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One row of the authoritative attribute table (`license.json`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LicenseAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        rename = "shouldRightsNotation",
        alias = "requiresAttribution"
    )]
    pub requires_attribution: bool,
    #[serde(
        default,
        rename = "canSecondaryDistribution",
        alias = "redistributionAllowed"
    )]
    pub redistribution_allowed: bool,
    #[serde(default, rename = "url", alias = "referenceUrl")]
    pub reference_url: String,
}

/// Effective policy for a license after the unknown-license fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicensePolicy {
    pub requires_attribution: bool,
    pub redistribution_allowed: bool,
    pub known: bool,
}

/// In-memory canonical record. The key lives in the owning map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalRecord {
    pub license: LicenseState,
    pub url: String,
    pub authors: String,
    pub display_name: String,
    pub ignore: bool,
}

/// On-disk row of the canonical table (`modlicense.json`).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CanonicalRow {
    #[serde(default)]
    pub modid: ItemId,
    #[serde(default)]
    pub license: LicenseState,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub authors: String,
    #[serde(
        default,
        rename = "displayName",
        deserialize_with = "nullable_string"
    )]
    pub display_name: String,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub ignore: bool,
}

fn nullable_string<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn nullable_bool<'de, D: serde::Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

impl CanonicalRow {
    pub fn into_parts(self) -> (ItemId, CanonicalRecord) {
        (
            self.modid,
            CanonicalRecord {
                license: self.license,
                url: self.url,
                authors: self.authors,
                display_name: self.display_name,
                ignore: self.ignore,
            },
        )
    }

    pub fn from_parts(modid: &ItemId, rec: &CanonicalRecord) -> Self {
        Self {
            modid: modid.clone(),
            license: rec.license.clone(),
            url: rec.url.clone(),
            authors: rec.authors.clone(),
            display_name: rec.display_name.clone(),
            ignore: rec.ignore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Archive,
    LinkDescriptor,
}

impl SourceKind {
    /// License stored for a brand-new record whose fact carried none.
    pub fn absent_license(self) -> LicenseState {
        match self {
            SourceKind::Archive => LicenseState::Unknown,
            SourceKind::LinkDescriptor => LicenseState::NotSpecified,
        }
    }
}

/// A license observation for one item, consumed immediately by the reconciler.
#[derive(Debug, Clone)]
pub struct ObservedFact {
    pub item_id: ItemId,
    pub detected_license: String,
    pub display_name: String,
    pub authors: String,
    pub source: SourceKind,
}

/// One row of a distribution's `license.json`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AttributionEntry {
    pub modid: ItemId,
    pub license: String,
    #[serde(rename = "shouldRightsNotation")]
    pub requires_attribution: bool,
    #[serde(rename = "canSecondaryDistribution")]
    pub redistribution_allowed: bool,
    pub url: String,
    #[serde(rename = "credit")]
    pub credit_line: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub modid: ItemId,
    pub license: String,
    /// Reference page of the license when the attribute table has one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reference: String,
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct AuditReport {
    pub unresolved: Vec<AuditFinding>,
    pub missing_link: Vec<AuditFinding>,
    pub prohibited: Vec<AuditFinding>,
    pub unregistered: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_release_blocking(&self) -> bool {
        !self.unresolved.is_empty() || !self.prohibited.is_empty()
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct MovedArchive {
    pub modid: ItemId,
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Serialize, Clone)]
pub struct MoveFailure {
    pub modid: ItemId,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct QuarantineReport {
    pub moved: Vec<MovedArchive>,
    pub skipped: Vec<String>,
    pub failed: Vec<MoveFailure>,
}

#[derive(Debug, Serialize, Clone)]
pub struct DistributionReport {
    pub name: String,
    pub items: usize,
    pub credits: usize,
    pub license_file: Option<PathBuf>,
    pub credit_file: Option<PathBuf>,
    /// Set when this distribution's files could not be written; the run goes on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entries: Vec<AttributionEntry>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub distributions: Vec<DistributionReport>,
    pub audit: AuditReport,
    pub quarantine: Option<QuarantineReport>,
    pub canonical_table: PathBuf,
    pub canonical_written: bool,
    pub published: Vec<PathBuf>,
}

/// Companion descriptor written by `describe`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LinkDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub artifact: DescriptorArtifact,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DescriptorArtifact {
    pub size: u64,
    #[serde(rename = "SHA256")]
    pub sha256: String,
    pub url: String,
    pub manual: ManualDownload,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ManualDownload {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DescribeReport {
    pub descriptor: LinkDescriptor,
    pub path: PathBuf,
}
