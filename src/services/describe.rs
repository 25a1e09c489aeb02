use crate::config::Config;
use crate::domain::models::{DescribeReport, DescriptorArtifact, LinkDescriptor, ManualDownload};
use crate::services::archive::read_manifests;
use crate::services::manifest::extract_manifest_fields;
use crate::services::storage::write_json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;
use tracing::info;

const DESCRIPTOR_KIND: &str = "ForgeMod";
const UNVERSIONED: &str = "unspecified";

/// Builds the link descriptor for `archive` and writes it as
/// `<stem>.link.json` into `out_dir` (default: next to the archive).
pub fn describe_archive(
    archive: &Path,
    group: &str,
    out_dir: Option<&Path>,
    config: &Config,
) -> anyhow::Result<DescribeReport> {
    let layout = &config.layout;
    let descriptor = build_descriptor(archive, group, config)?;

    let file_name = descriptor.artifact.manual.name.clone();
    let stem = strip_suffix_ignore_case(&file_name, &layout.archive_ext);
    let dir = match out_dir {
        Some(d) => d.to_path_buf(),
        None => archive
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let path = dir.join(format!("{stem}.{}", layout.descriptor_suffix));
    write_json(&path, &descriptor)?;
    info!(archive = %archive.display(), path = %path.display(), id = %descriptor.id, "descriptor written");

    Ok(DescribeReport { descriptor, path })
}

pub fn build_descriptor(
    archive: &Path,
    group: &str,
    config: &Config,
) -> anyhow::Result<LinkDescriptor> {
    let group = group.trim();
    if group.is_empty() {
        anyhow::bail!("group must not be empty");
    }
    let manifests = read_manifests(archive, &config.limits, &config.layout.manifest_name)?;
    if manifests.is_empty() {
        anyhow::bail!(
            "no {} found in {}",
            config.layout.manifest_name,
            archive.display()
        );
    }
    let Some(fields) = manifests
        .iter()
        .map(|m| extract_manifest_fields(&m.text))
        .find(|f| !f.item_id().trim().is_empty())
    else {
        anyhow::bail!("manifest in {} declares no modId", archive.display());
    };

    let item_id = fields.item_id().trim().to_string();
    let version = match fields.version.trim() {
        "" => UNVERSIONED,
        v => v,
    };
    let name = match fields.display_name.trim() {
        "" => item_id.clone(),
        n => n.to_string(),
    };
    let (size, sha256) = digest_file(archive)?;
    let file_name = archive
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(LinkDescriptor {
        id: format!("{group}:{item_id}:{version}@jar"),
        name,
        kind: DESCRIPTOR_KIND.to_string(),
        artifact: DescriptorArtifact {
            size,
            sha256,
            url: String::new(),
            manual: ManualDownload {
                url: String::new(),
                name: file_name,
            },
        },
    })
}

fn digest_file(path: &Path) -> anyhow::Result<(u64, String)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let size = std::io::copy(&mut file, &mut hasher)?;
    Ok((size, hex::encode(hasher.finalize())))
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> &'a str {
    let cut = name.len().saturating_sub(suffix.len());
    match name.get(cut..) {
        Some(tail) if tail.eq_ignore_ascii_case(suffix) => &name[..cut],
        _ => name,
    }
}
