use crate::domain::models::{AuditFinding, AuditReport};
use crate::services::engine::Reconciler;
use crate::services::license_table::LicenseTable;
use tracing::warn;

/// Classifies every non-ignored record of the final canonical table.
/// An item may land in several lists.
pub fn audit(reconciler: &Reconciler, licenses: &LicenseTable) -> AuditReport {
    let mut report = AuditReport::default();
    for (id, rec) in reconciler.table() {
        if rec.ignore {
            continue;
        }
        let license = rec.license.as_str();
        let attr = licenses.get(license);
        let reference = attr
            .map(|a| a.reference_url.trim().to_string())
            .unwrap_or_default();
        let finding = || AuditFinding {
            modid: id.clone(),
            license: license.to_string(),
            reference: reference.clone(),
        };

        if rec.license.is_unresolved() {
            report.unresolved.push(finding());
        }
        if licenses.policy(license).requires_attribution && rec.url.trim().is_empty() {
            report.missing_link.push(finding());
        }
        if reconciler.is_archive_sourced(id) && attr.is_some_and(|a| !a.redistribution_allowed) {
            report.prohibited.push(finding());
        }
        if !license.trim().is_empty() && !licenses.contains(license) {
            report.unregistered.push(finding());
        }
    }
    report
}

pub fn log_findings(report: &AuditReport) {
    let sections = [
        ("license unresolved (Not specified / unknown)", &report.unresolved),
        ("attribution required but url missing", &report.missing_link),
        ("redistribution prohibited", &report.prohibited),
        ("license not registered in attribute table", &report.unregistered),
    ];
    for (title, findings) in sections {
        if findings.is_empty() {
            continue;
        }
        warn!(count = findings.len(), "{title}");
        for f in findings {
            warn!(modid = %f.modid, license = %f.license, "  - {title}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::license::ItemId;
    use crate::domain::models::{LicenseAttribute, ObservedFact, SourceKind};
    use std::path::Path;

    fn licenses() -> LicenseTable {
        LicenseTable::from_rows(vec![
            LicenseAttribute {
                name: "MIT".to_string(),
                requires_attribution: true,
                redistribution_allowed: true,
                reference_url: " https://opensource.org/license/mit ".to_string(),
            },
            LicenseAttribute {
                name: "ARR".to_string(),
                requires_attribution: false,
                redistribution_allowed: false,
                reference_url: String::new(),
            },
        ])
    }

    fn observe(r: &mut Reconciler, id: &str, license: &str, source: SourceKind) {
        let item_id = ItemId::new(id);
        r.observe(&ObservedFact {
            item_id: item_id.clone(),
            detected_license: license.to_string(),
            display_name: String::new(),
            authors: String::new(),
            source,
        });
        if source == SourceKind::Archive {
            r.record_archive(&item_id, Path::new("/jars/x.jar"));
        }
    }

    fn ids(findings: &[AuditFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.modid.as_str()).collect()
    }

    #[test]
    fn archive_without_license_is_unresolved_but_not_prohibited() {
        let mut r = Reconciler::default();
        observe(&mut r, "foo", "", SourceKind::Archive);
        let report = audit(&r, &licenses());
        assert_eq!(ids(&report.unresolved), vec!["foo"]);
        assert_eq!(ids(&report.unregistered), vec!["foo"]);
        assert_eq!(ids(&report.missing_link), vec!["foo"]);
        assert!(report.prohibited.is_empty());
    }

    #[test]
    fn only_archive_sourced_items_are_prohibited() {
        let mut r = Reconciler::default();
        observe(&mut r, "jarred", "ARR", SourceKind::Archive);
        observe(&mut r, "linked", "ARR", SourceKind::LinkDescriptor);
        let report = audit(&r, &licenses());
        assert_eq!(ids(&report.prohibited), vec!["jarred"]);
        assert!(report.missing_link.is_empty());
        assert!(report.is_release_blocking());
    }

    #[test]
    fn unregistered_concrete_license_is_not_unresolved() {
        let mut r = Reconciler::default();
        observe(&mut r, "odd", "WTFPL", SourceKind::Archive);
        let report = audit(&r, &licenses());
        assert!(report.unresolved.is_empty());
        assert_eq!(ids(&report.unregistered), vec!["odd"]);
        assert!(report.prohibited.is_empty());
    }

    #[test]
    fn ignored_items_are_never_classified() {
        let mut table = crate::services::engine::CanonicalTable::new();
        table.insert(
            ItemId::new("quiet"),
            crate::domain::models::CanonicalRecord {
                ignore: true,
                ..Default::default()
            },
        );
        let mut r = Reconciler::new(table);
        observe(&mut r, "quiet", "ARR", SourceKind::Archive);
        let report = audit(&r, &licenses());
        assert!(report.unresolved.is_empty());
        assert!(report.missing_link.is_empty());
        assert!(report.prohibited.is_empty());
        assert!(report.unregistered.is_empty());
    }

    #[test]
    fn linked_mit_item_needs_a_url() {
        let mut r = Reconciler::default();
        observe(&mut r, "lib", "MIT", SourceKind::LinkDescriptor);
        let report = audit(&r, &licenses());
        assert_eq!(ids(&report.missing_link), vec!["lib"]);
        assert!(!report.is_release_blocking());
    }

    #[test]
    fn findings_carry_the_license_reference_page() {
        let mut r = Reconciler::default();
        observe(&mut r, "lib", "mit", SourceKind::LinkDescriptor);
        observe(&mut r, "odd", "WTFPL", SourceKind::Archive);
        let report = audit(&r, &licenses());
        assert_eq!(
            report.missing_link[0].reference,
            "https://opensource.org/license/mit"
        );
        assert_eq!(report.unregistered[0].modid.as_str(), "odd");
        assert_eq!(report.unregistered[0].reference, "");
    }
}
