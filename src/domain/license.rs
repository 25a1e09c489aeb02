use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stored when a link descriptor carries no license.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Stored when an archive manifest carries no license.
pub const UNKNOWN: &str = "unknown";

/// Normalized item identifier (trimmed, lower-cased).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(ItemId::new(raw.as_deref().unwrap_or("")))
    }
}

/// License value of a canonical record.
///
/// The two sentinels are kept apart from concrete names so the merge step
/// never has to compare magic strings. They only become text at the JSON
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LicenseState {
    #[default]
    Unset,
    NotSpecified,
    Unknown,
    Concrete(String),
}

impl LicenseState {
    /// Parses a stored value. Only the exact sentinel spellings map to the
    /// sentinel variants; anything else is kept verbatim.
    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "" => LicenseState::Unset,
            NOT_SPECIFIED => LicenseState::NotSpecified,
            UNKNOWN => LicenseState::Unknown,
            other => LicenseState::Concrete(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LicenseState::Unset => "",
            LicenseState::NotSpecified => NOT_SPECIFIED,
            LicenseState::Unknown => UNKNOWN,
            LicenseState::Concrete(name) => name,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, LicenseState::NotSpecified | LicenseState::Unknown)
    }

    /// Empty, or any casing of "not specified" / "unknown".
    pub fn is_unresolved(&self) -> bool {
        match self {
            LicenseState::Concrete(name) => {
                let lower = name.to_lowercase();
                lower == "not specified" || lower == "unknown"
            }
            _ => true,
        }
    }
}

impl fmt::Display for LicenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LicenseState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LicenseState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(LicenseState::from_stored(raw.as_deref().unwrap_or("")))
    }
}

/// True when a fact carries a usable license: non-empty and not any casing
/// of "Not specified".
pub fn has_detected(detected: &str) -> bool {
    !detected.is_empty() && !detected.eq_ignore_ascii_case(NOT_SPECIFIED)
}
