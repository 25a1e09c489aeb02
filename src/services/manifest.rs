//! Tolerant field extraction from `mods.toml`-style manifest text.
//!
//! Only `key = "value"` lines are recognised (single or double quotes, key
//! matched case-insensitively at line start). Anything else is ignored, so
//! malformed input simply produces empty fields.

use regex::Regex;
use std::sync::LazyLock;

static LICENSE_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("license"));
static MOD_ID_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("modId"));
static DISPLAY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("displayName"));
static AUTHORS_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("authors"));
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| field_pattern("version"));

fn field_pattern(key: &str) -> Regex {
    Regex::new(&format!(r#"(?im)^\s*{key}\s*=\s*["']([^"']+)["']"#))
        .expect("manifest field pattern is valid")
}

/// Every license/id declaration in document order, plus the first of each
/// single-valued field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManifestFields {
    pub licenses: Vec<String>,
    pub item_ids: Vec<String>,
    pub display_name: String,
    pub authors: String,
    pub version: String,
}

impl ManifestFields {
    /// The first declaration is authoritative.
    pub fn license(&self) -> &str {
        self.licenses.first().map(String::as_str).unwrap_or("")
    }

    pub fn item_id(&self) -> &str {
        self.item_ids.first().map(String::as_str).unwrap_or("")
    }
}

pub fn extract_manifest_fields(text: &str) -> ManifestFields {
    ManifestFields {
        licenses: all_values(&LICENSE_RE, text),
        item_ids: all_values(&MOD_ID_RE, text),
        display_name: first_value(&DISPLAY_NAME_RE, text),
        authors: first_value(&AUTHORS_RE, text),
        version: first_value(&VERSION_RE, text),
    }
}

fn all_values(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

fn first_value(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
