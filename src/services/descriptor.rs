use crate::domain::license::NOT_SPECIFIED;
use crate::error::ArtifactError;
use serde_json::Value;
use std::path::Path;

pub const PLACEHOLDER_AUTHOR: &str = "<author>";
const DESCRIPTOR_FILE_SUFFIX: &str = ".link.json";

/// Facts read from one `*link.json` companion file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFacts {
    pub item_id: String,
    pub license: String,
    pub display_name: String,
    pub authors: String,
}

pub fn read_link_descriptor(path: &Path, archive_ext: &str) -> Result<LinkFacts, ArtifactError> {
    let bad = |reason: String| ArtifactError::BadDescriptor {
        path: path.to_path_buf(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| bad(e.to_string()))?;
    let v: Value = serde_json::from_str(&raw).map_err(|e| bad(e.to_string()))?;
    if !v.is_object() {
        return Err(bad("descriptor is not a JSON object".to_string()));
    }
    Ok(link_facts(&v, path, archive_ext))
}

pub fn link_facts(v: &Value, path: &Path, archive_ext: &str) -> LinkFacts {
    let item_id = id_from_compound(v)
        .or_else(|| id_from_manual_name(v, archive_ext))
        .or_else(|| id_from_display_name(v))
        .unwrap_or_else(|| id_from_file_name(path));

    let license = str_at(v, &["artifact", "license"]).trim().to_string();
    let display_name = str_at(v, &["name"]).trim().to_string();
    let authors = str_at(v, &["author"]).trim().to_string();

    LinkFacts {
        license: non_empty_or(license, NOT_SPECIFIED),
        display_name: non_empty_or(display_name, &item_id),
        authors: non_empty_or(authors, PLACEHOLDER_AUTHOR),
        item_id,
    }
}

fn str_at<'a>(v: &'a Value, keys: &[&str]) -> &'a str {
    let mut cur = v;
    for k in keys {
        match cur.get(k) {
            Some(next) => cur = next,
            None => return "",
        }
    }
    cur.as_str().unwrap_or("")
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|s| !s.is_empty())
}

/// `group:itemId:version@kind` -> `itemId`.
fn id_from_compound(v: &Value) -> Option<String> {
    let id = v.get("id")?.as_str()?;
    if !id.contains(':') {
        return None;
    }
    non_empty(id.split(':').nth(1)?.trim().to_string())
}

fn id_from_manual_name(v: &Value, archive_ext: &str) -> Option<String> {
    let name = str_at(v, &["artifact", "manual", "name"]);
    let base = name.rsplit('/').next().unwrap_or("").to_lowercase();
    let ext = archive_ext.to_lowercase();
    let stem = base.strip_suffix(ext.as_str()).unwrap_or(&base);
    non_empty(sanitize_id(stem))
}

fn id_from_display_name(v: &Value) -> Option<String> {
    non_empty(sanitize_id(v.get("name")?.as_str()?))
}

fn id_from_file_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    file.strip_suffix(DESCRIPTOR_FILE_SUFFIX)
        .unwrap_or(&file)
        .to_lowercase()
}

/// Lower-cases and maps everything outside `[a-z0-9_.-]` to `_`.
pub fn sanitize_id(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
