//! Whole-run orchestration: setup, per-distribution passes, audit,
//! quarantine, persistence.

use crate::config::Config;
use crate::domain::models::{DistributionReport, RunReport};
use crate::error::SetupError;
use crate::services::archive::ArchiveScanner;
use crate::services::audit::{audit, log_findings};
use crate::services::distribution::{
    credit_lines, enumerate_artifacts, reconcile_distribution, write_outputs, Artifacts,
};
use crate::services::engine::Reconciler;
use crate::services::quarantine::quarantine_prohibited;
use crate::services::storage::{
    load_canonical_table, load_license_table, publish_tables, save_canonical_table, TablePaths,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Write attribution files, the canonical table and display copies.
    pub write: bool,
    /// Move prohibited archives. Only honoured together with `write`.
    pub quarantine: bool,
}

pub fn run(
    root: &Path,
    config: &Config,
    server: Option<&str>,
    opts: RunOptions,
) -> anyhow::Result<RunReport> {
    let layout = &config.layout;
    let paths = TablePaths::resolve(root, layout);
    let licenses = load_license_table(&paths)?;
    let canonical = load_canonical_table(&paths.canonical_table)?;
    let targets = resolve_targets(root, &config.layout.servers_dir, server)?;

    let mut reconciler = Reconciler::new(canonical);
    let mut scanner = ArchiveScanner::new(config.limits.clone(), &layout.manifest_name);
    let mut distributions = Vec::new();

    for (name, dist_dir) in targets {
        info!(distribution = %name, "processing");
        let mods_dir = dist_dir.join(&layout.mods_dir);
        let artifacts = if mods_dir.is_dir() {
            enumerate_artifacts(&mods_dir, layout)
        } else {
            info!(distribution = %name, "no {} directory, empty listing", layout.mods_dir);
            Artifacts::default()
        };
        let seen = reconcile_distribution(&artifacts, layout, &mut scanner, &mut reconciler);
        let entries = reconciler.attribution(&seen, &licenses);
        let credits = credit_lines(&entries).len();

        let (mut license_file, mut credit_file, mut error) = (None, None, None);
        if opts.write {
            match write_outputs(&dist_dir, layout, &entries) {
                Ok(written) => {
                    license_file = Some(written.license_file);
                    credit_file = written.credit_file;
                }
                Err(e) => {
                    warn!(distribution = %name, "writing attribution files failed: {e:#}");
                    error = Some(format!("{e:#}"));
                }
            }
        }
        distributions.push(DistributionReport {
            name,
            items: entries.len(),
            credits,
            license_file,
            credit_file,
            error,
            entries,
        });
    }

    let report = audit(&reconciler, &licenses);
    log_findings(&report);

    let quarantine = (opts.write && opts.quarantine).then(|| {
        quarantine_prohibited(
            &report.prohibited,
            &reconciler,
            &root.join(&layout.quarantine_dir),
        )
    });

    let canonical_written = opts.write && reconciler.is_dirty();
    if canonical_written {
        save_canonical_table(&paths.canonical_table, reconciler.table())?;
    } else if reconciler.is_dirty() {
        info!("canonical table changed in memory only (read-only run)");
    } else {
        info!("canonical table unchanged");
    }

    let published = if opts.write {
        publish_tables(&paths, &root.join(&layout.publish_dir))
    } else {
        Vec::new()
    };

    Ok(RunReport {
        distributions,
        audit: report,
        quarantine,
        canonical_table: paths.canonical_table,
        canonical_written,
        published,
    })
}

/// Distribution directories to process, sorted by name.
pub fn resolve_targets(
    root: &Path,
    servers_dir: &str,
    server: Option<&str>,
) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let servers = root.join(servers_dir);
    if !servers.is_dir() {
        return Err(SetupError::MissingServersDir(servers).into());
    }
    if let Some(name) = server {
        let dir = servers.join(name);
        if !dir.is_dir() {
            return Err(SetupError::UnknownDistribution(name.to_string()).into());
        }
        return Ok(vec![(name.to_string(), dir)]);
    }

    let mut targets = Vec::new();
    for entry in std::fs::read_dir(&servers)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            targets.push((entry.file_name().to_string_lossy().to_string(), entry.path()));
        }
    }
    targets.sort();
    Ok(targets)
}
