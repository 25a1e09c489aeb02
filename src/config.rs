use crate::error::SetupError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "modlic.toml";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub limits: Limits,
}

/// Where things live, relative to the project root.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Layout {
    pub servers_dir: String,
    pub mods_dir: String,
    pub buckets: Vec<String>,
    /// Candidate directories for the two tables, first existing wins.
    pub table_dirs: Vec<String>,
    pub license_table: String,
    pub canonical_table: String,
    pub attribution_file: String,
    pub credit_file: String,
    pub quarantine_dir: String,
    pub publish_dir: String,
    pub manifest_name: String,
    pub archive_ext: String,
    pub descriptor_suffix: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            servers_dir: "servers".to_string(),
            mods_dir: "forgemods".to_string(),
            buckets: vec![
                "optionaloff".to_string(),
                "optionalon".to_string(),
                "required".to_string(),
            ],
            table_dirs: vec![".".to_string(), "scripts".to_string()],
            license_table: "license.json".to_string(),
            canonical_table: "modlicense.json".to_string(),
            attribution_file: "license.json".to_string(),
            credit_file: "credit.txt".to_string(),
            quarantine_dir: "scripts/mods".to_string(),
            publish_dir: "docs".to_string(),
            manifest_name: "mods.toml".to_string(),
            archive_ext: ".jar".to_string(),
            descriptor_suffix: "link.json".to_string(),
        }
    }
}

/// Bounds applied while reading archives.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Limits {
    pub max_archive_bytes: u64,
    pub max_entry_bytes: usize,
    pub entry_timeout_secs: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_archive_bytes: 256 * 1024 * 1024,
            max_entry_bytes: 1024 * 1024,
            entry_timeout_secs: 30,
        }
    }
}

impl Limits {
    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs)
    }
}

/// Loads `explicit` if given (must exist), else `<root>/modlic.toml` when
/// present, else defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path: PathBuf = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = root.join(DEFAULT_CONFIG_FILE);
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| SetupError::BadConfig {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    let config = toml::from_str(&raw).map_err(|e| SetupError::BadConfig {
        path,
        reason: e.to_string(),
    })?;
    Ok(config)
}
