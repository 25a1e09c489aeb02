use crate::domain::models::{LicenseAttribute, LicensePolicy};
use std::collections::HashMap;

/// Authoritative license attributes, keyed by lower-cased name.
#[derive(Debug, Default, Clone)]
pub struct LicenseTable {
    by_name: HashMap<String, LicenseAttribute>,
}

impl LicenseTable {
    pub fn from_rows(rows: Vec<LicenseAttribute>) -> Self {
        let by_name = rows
            .into_iter()
            .map(|row| (row.name.to_lowercase(), row))
            .collect();
        Self { by_name }
    }

    pub fn get(&self, license: &str) -> Option<&LicenseAttribute> {
        self.by_name.get(&license.trim().to_lowercase())
    }

    pub fn contains(&self, license: &str) -> bool {
        self.get(license).is_some()
    }

    /// Unknown licenses get the most conservative policy: credit required,
    /// no redistribution.
    pub fn policy(&self, license: &str) -> LicensePolicy {
        match self.get(license) {
            Some(attr) => LicensePolicy {
                requires_attribution: attr.requires_attribution,
                redistribution_allowed: attr.redistribution_allowed,
                known: true,
            },
            None => LicensePolicy {
                requires_attribution: true,
                redistribution_allowed: false,
                known: false,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
