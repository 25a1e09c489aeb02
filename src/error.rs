use std::path::PathBuf;

/// Failure to read one artifact. Never fatal for a run: callers log and skip.
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("stat failed for {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("empty archive: {0}")]
    Empty(PathBuf),
    #[error("archive too large ({size} bytes, limit {max}): {path}")]
    TooLarge { path: PathBuf, size: u64, max: u64 },
    #[error("read error for {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corrupt archive {path}: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },
    #[error("bad link descriptor {path}: {reason}")]
    BadDescriptor { path: PathBuf, reason: String },
}

/// Errors that abort the whole run before any distribution is touched.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error("license attribute table not found (looked for {0})")]
    MissingLicenseTable(String),
    #[error("cannot parse {path}: {reason}")]
    BadTable { path: PathBuf, reason: String },
    #[error("cannot parse config {path}: {reason}")]
    BadConfig { path: PathBuf, reason: String },
    #[error("servers directory not found: {0}")]
    MissingServersDir(PathBuf),
    #[error("distribution not found: {0}")]
    UnknownDistribution(String),
}

impl SetupError {
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::MissingLicenseTable(_) => "MISSING_LICENSE_TABLE",
            _ => "SETUP",
        }
    }
}
