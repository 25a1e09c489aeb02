use crate::domain::models::{AuditFinding, MoveFailure, MovedArchive, QuarantineReport};
use crate::services::engine::Reconciler;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Moves every known archive of each prohibited item into `dest_dir`.
/// Failures are recorded per file and never stop the remaining moves.
pub fn quarantine_prohibited(
    prohibited: &[AuditFinding],
    reconciler: &Reconciler,
    dest_dir: &Path,
) -> QuarantineReport {
    let mut report = QuarantineReport::default();
    if prohibited.is_empty() {
        return report;
    }
    warn!(dest = %dest_dir.display(), count = prohibited.len(), "quarantining archives");

    for finding in prohibited {
        let id = &finding.modid;
        if reconciler.table().get(id).is_some_and(|r| r.ignore) {
            warn!(modid = %id, "ignore=true, not moving");
            report.skipped.push(id.to_string());
            continue;
        }
        let Some(paths) = reconciler.archive_paths().get(id).filter(|p| !p.is_empty()) else {
            warn!(modid = %id, "no archive path known, not moving");
            report.skipped.push(id.to_string());
            continue;
        };
        for path in paths {
            if !path.exists() {
                warn!(modid = %id, path = %path.display(), "archive already gone");
                continue;
            }
            match move_file_safe(path, dest_dir) {
                Ok(to) => {
                    warn!(modid = %id, from = %path.display(), to = %to.display(), "moved");
                    report.moved.push(MovedArchive {
                        modid: id.clone(),
                        from: path.clone(),
                        to,
                    });
                }
                Err(e) => {
                    warn!(modid = %id, path = %path.display(), "move failed: {e}");
                    report.failed.push(MoveFailure {
                        modid: id.clone(),
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
    report
}

/// Moves `src` into `dest_dir`, renaming to `name (n).ext` on collision.
pub fn move_file_safe(src: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    relocate(src, dest_dir, |from, to| std::fs::rename(from, to))
}

fn relocate(
    src: &Path,
    dest_dir: &Path,
    rename: impl Fn(&Path, &Path) -> io::Result<()>,
) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dest_dir)?;
    let file_name = src
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;
    let dest = free_destination(dest_dir, Path::new(file_name));
    match rename(src, &dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            std::fs::copy(src, &dest)?;
            if let Err(e) = std::fs::remove_file(src) {
                warn!(path = %src.display(), "copied but could not remove source: {e}");
            }
        }
        Err(e) => return Err(e),
    }
    Ok(dest)
}

fn free_destination(dest_dir: &Path, file_name: &Path) -> PathBuf {
    let mut dest = dest_dir.join(file_name);
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut n = 1;
    while dest.exists() {
        dest = dest_dir.join(format!("{stem} ({n}){ext}"));
        n += 1;
    }
    dest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::license::ItemId;
    use crate::domain::models::{CanonicalRecord, ObservedFact, SourceKind};
    use crate::services::engine::CanonicalTable;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collisions_get_numbered_suffixes() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("quarantine");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("name.ext"), b"original").unwrap();

        for (dir, body) in [("a", "first"), ("b", "second")] {
            let src_dir = tmp.path().join(dir);
            fs::create_dir_all(&src_dir).unwrap();
            let src = src_dir.join("name.ext");
            fs::write(&src, body).unwrap();
            move_file_safe(&src, &dest).unwrap();
            assert!(!src.exists());
        }

        assert_eq!(fs::read_to_string(dest.join("name.ext")).unwrap(), "original");
        assert_eq!(fs::read_to_string(dest.join("name (1).ext")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dest.join("name (2).ext")).unwrap(), "second");
    }

    #[test]
    fn cross_device_rename_falls_back_to_copy() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("mod.jar");
        fs::write(&src, b"jar bytes").unwrap();
        let dest = tmp.path().join("q");

        let moved = relocate(&src, &dest, |_, _| {
            Err(io::Error::from(io::ErrorKind::CrossesDevices))
        })
        .unwrap();

        assert_eq!(moved, dest.join("mod.jar"));
        assert_eq!(fs::read(&moved).unwrap(), b"jar bytes");
        assert!(!src.exists());
    }

    #[test]
    fn other_rename_errors_are_reported() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("mod.jar");
        fs::write(&src, b"x").unwrap();
        let err = relocate(&src, &tmp.path().join("q"), |_, _| {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(src.exists());
    }

    fn prohibited(id: &str) -> AuditFinding {
        AuditFinding {
            modid: ItemId::new(id),
            license: "ARR".to_string(),
            reference: String::new(),
        }
    }

    #[test]
    fn descriptor_only_and_ignored_items_are_not_moved() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("kept.jar");
        fs::write(&jar, b"x").unwrap();

        let mut table = CanonicalTable::new();
        table.insert(
            ItemId::new("kept"),
            CanonicalRecord {
                ignore: true,
                ..Default::default()
            },
        );
        let mut r = Reconciler::new(table);
        r.record_archive(&ItemId::new("kept"), &jar);
        r.observe(&ObservedFact {
            item_id: ItemId::new("linkonly"),
            detected_license: "ARR".to_string(),
            display_name: String::new(),
            authors: String::new(),
            source: SourceKind::LinkDescriptor,
        });

        let report = quarantine_prohibited(
            &[prohibited("kept"), prohibited("linkonly")],
            &r,
            &tmp.path().join("q"),
        );
        assert!(report.moved.is_empty());
        assert_eq!(report.skipped, vec!["kept", "linkonly"]);
        assert!(jar.exists());
    }

    #[test]
    fn missing_archives_are_skipped_and_others_moved() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("present.jar");
        fs::write(&present, b"x").unwrap();
        let mut r = Reconciler::default();
        let id = ItemId::new("bad");
        r.record_archive(&id, &tmp.path().join("gone.jar"));
        r.record_archive(&id, &present);

        let dest = tmp.path().join("q");
        let report = quarantine_prohibited(&[prohibited("bad")], &r, &dest);
        assert_eq!(report.moved.len(), 1);
        assert!(report.failed.is_empty());
        assert!(dest.join("present.jar").exists());
        assert!(!present.exists());
    }
}
