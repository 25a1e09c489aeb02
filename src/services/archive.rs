//! Manifest lookup inside plugin archives.
//!
//! # Invariants
//! - A bad archive never fails the run: every skip is logged and yields no entries.
//! - Entry reads are bounded by `max_entry_bytes` and `entry_timeout`; on either
//!   limit the bytes read so far are kept.
//! - Results are cached per path for the lifetime of one scanner.

use crate::config::Limits;
use crate::error::ArtifactError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use zip::ZipArchive;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub text: String,
}

pub struct ArchiveScanner {
    limits: Limits,
    manifest_name: String,
    cache: HashMap<PathBuf, Vec<ManifestEntry>>,
}

impl ArchiveScanner {
    pub fn new(limits: Limits, manifest_name: &str) -> Self {
        Self {
            limits,
            manifest_name: manifest_name.to_string(),
            cache: HashMap::new(),
        }
    }

    /// Manifest entries of `path`; empty when the archive was skipped or
    /// holds no manifest.
    pub fn manifests(&mut self, path: &Path) -> &[ManifestEntry] {
        if self.cache.contains_key(path) {
            debug!(archive = %path.display(), "manifest cache hit");
        } else {
            let entries = match read_manifests(path, &self.limits, &self.manifest_name) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(archive = %path.display(), "SKIP: {e}");
                    Vec::new()
                }
            };
            self.cache.insert(path.to_path_buf(), entries);
        }
        self.cache.get(path).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn read_manifests(
    path: &Path,
    limits: &Limits,
    manifest_name: &str,
) -> Result<Vec<ManifestEntry>, ArtifactError> {
    let meta = std::fs::metadata(path).map_err(|source| ArtifactError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(ArtifactError::NotAFile(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(ArtifactError::Empty(path.to_path_buf()));
    }
    if meta.len() > limits.max_archive_bytes {
        return Err(ArtifactError::TooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: limits.max_archive_bytes,
        });
    }

    let file = File::open(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| ArtifactError::CorruptArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(archive = %path.display(), index = i, "entry read error: {e}");
                continue;
            }
        };
        let name = entry.name().to_string();
        if !is_manifest_entry(&name, manifest_name) {
            continue;
        }
        let deadline = Instant::now() + limits.entry_timeout();
        let bytes = read_bounded(&mut entry, limits.max_entry_bytes, deadline);
        out.push(ManifestEntry {
            name,
            text: decode_manifest(&bytes),
        });
    }
    Ok(out)
}

fn is_manifest_entry(entry_name: &str, manifest_name: &str) -> bool {
    let base = entry_name.rsplit(['/', '\\']).next().unwrap_or(entry_name);
    base.eq_ignore_ascii_case(manifest_name)
}

/// Reads until EOF, `max_bytes`, `deadline` or an I/O error, whichever comes
/// first, and returns what was accumulated.
pub fn read_bounded<R: Read>(reader: &mut R, max_bytes: usize, deadline: Instant) -> Vec<u8> {
    let mut acc = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    while acc.len() < max_bytes {
        if Instant::now() >= deadline {
            warn!(read = acc.len(), "entry read timed out, keeping partial data");
            break;
        }
        let want = chunk.len().min(max_bytes - acc.len());
        match reader.read(&mut chunk[..want]) {
            Ok(0) => break,
            Ok(n) => acc.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(read = acc.len(), "entry read error: {e}");
                break;
            }
        }
    }
    acc
}

/// UTF-8 first; Latin-1 when the UTF-8 reading has no word characters.
pub fn decode_manifest(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes).into_owned();
    if text.chars().any(|c| c.is_ascii_alphanumeric() || c == '_') {
        return text;
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    pub(crate) fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn finds_manifest_by_base_name() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("a.jar");
        write_jar(
            &jar,
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
                ("META-INF/mods.toml", b"modId=\"a\"\nlicense=\"MIT\"\n"),
            ],
        );
        let entries = read_manifests(&jar, &Limits::default(), "mods.toml").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "META-INF/mods.toml");
        assert!(entries[0].text.contains("license=\"MIT\""));
    }

    #[test]
    fn tolerates_several_manifests() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("multi.jar");
        write_jar(
            &jar,
            &[
                ("META-INF/mods.toml", b"modId=\"outer\"\n"),
                ("META-INF/jarjar/MODS.TOML", b"modId=\"inner\"\n"),
            ],
        );
        let entries = read_manifests(&jar, &Limits::default(), "mods.toml").unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn skips_empty_missing_and_corrupt_archives() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty.jar");
        File::create(&empty).unwrap();
        let corrupt = tmp.path().join("corrupt.jar");
        std::fs::write(&corrupt, b"definitely not a zip").unwrap();
        let limits = Limits::default();

        assert!(matches!(
            read_manifests(&empty, &limits, "mods.toml"),
            Err(ArtifactError::Empty(_))
        ));
        assert!(matches!(
            read_manifests(&corrupt, &limits, "mods.toml"),
            Err(ArtifactError::CorruptArchive { .. })
        ));
        assert!(matches!(
            read_manifests(&tmp.path().join("nope.jar"), &limits, "mods.toml"),
            Err(ArtifactError::Stat { .. })
        ));
        assert!(matches!(
            read_manifests(tmp.path(), &limits, "mods.toml"),
            Err(ArtifactError::NotAFile(_))
        ));
    }

    #[test]
    fn rejects_archives_over_the_size_ceiling() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("big.jar");
        write_jar(&jar, &[("META-INF/mods.toml", b"modId=\"big\"\n")]);
        let limits = Limits {
            max_archive_bytes: 16,
            ..Limits::default()
        };
        assert!(matches!(
            read_manifests(&jar, &limits, "mods.toml"),
            Err(ArtifactError::TooLarge { max: 16, .. })
        ));
    }

    #[test]
    fn entry_reads_stop_at_the_byte_ceiling() {
        let body = vec![b'a'; 50_000];
        let out = read_bounded(
            &mut body.as_slice(),
            20_000,
            Instant::now() + Duration::from_secs(5),
        );
        assert_eq!(out.len(), 20_000);
    }

    struct SlowReader {
        remaining: usize,
    }

    impl Read for SlowReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Ok(0);
            }
            std::thread::sleep(Duration::from_millis(40));
            self.remaining -= 1;
            buf[0] = b'x';
            Ok(1)
        }
    }

    #[test]
    fn timed_out_reads_keep_partial_data() {
        let mut reader = SlowReader { remaining: 20 };
        let out = read_bounded(
            &mut reader,
            1024,
            Instant::now() + Duration::from_millis(150),
        );
        assert!(!out.is_empty());
        assert!(out.len() < 20);
    }

    #[test]
    fn expired_deadline_reads_nothing() {
        let out = read_bounded(&mut &b"modId=\"x\""[..], 1024, Instant::now());
        assert!(out.is_empty());
    }

    #[test]
    fn falls_back_to_latin1_without_word_characters() {
        assert_eq!(decode_manifest("modId=\"é\"".as_bytes()), "modId=\"é\"");
        assert_eq!(decode_manifest(&[0xE9, 0xE8, 0x20]), "éè ");
    }

    #[test]
    fn scanner_caches_per_path() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("c.jar");
        write_jar(&jar, &[("META-INF/mods.toml", b"modId=\"c\"\n")]);
        let mut scanner = ArchiveScanner::new(Limits::default(), "mods.toml");
        assert_eq!(scanner.manifests(&jar).len(), 1);
        std::fs::remove_file(&jar).unwrap();
        assert_eq!(scanner.manifests(&jar).len(), 1);
    }
}
