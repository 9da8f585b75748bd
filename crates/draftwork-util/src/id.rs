//! ULID-based identifier generation with prefixes.
//!
//! Identifiers in draftwork follow the pattern: `prefix_ulid`
//! For example: `snp_01HQXYZ...` for snapshots. ULIDs are lexically
//! time-ordered, so ids double as a stable tie-break when two records
//! share a timestamp.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Snapshot,
    Session,
}

impl IdPrefix {
    /// Get the string prefix for this identifier type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Snapshot => "snp",
            IdPrefix::Session => "ses",
        }
    }

    /// Parse a prefix from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "snp" => Some(IdPrefix::Snapshot),
            "ses" => Some(IdPrefix::Session),
            _ => None,
        }
    }
}

/// Generate a new prefixed identifier.
pub fn new_id(prefix: IdPrefix) -> String {
    format!("{}_{}", prefix.as_str(), Ulid::new().to_string().to_lowercase())
}

/// Check whether an id carries the expected prefix and a plausible ULID.
pub fn is_valid(id: &str, prefix: IdPrefix) -> bool {
    match id.split_once('_') {
        Some((p, rest)) => p == prefix.as_str() && rest.len() == 26,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_has_prefix() {
        let id = new_id(IdPrefix::Snapshot);
        assert!(id.starts_with("snp_"));
        assert!(is_valid(&id, IdPrefix::Snapshot));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_id(IdPrefix::Snapshot);
        let b = new_id(IdPrefix::Snapshot);
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_sort_by_creation_time() {
        let a = new_id(IdPrefix::Snapshot);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_id(IdPrefix::Snapshot);
        assert!(a < b);
    }

    #[test]
    fn test_prefix_parse() {
        assert_eq!(IdPrefix::parse("snp"), Some(IdPrefix::Snapshot));
        assert_eq!(IdPrefix::parse("ses"), Some(IdPrefix::Session));
        assert_eq!(IdPrefix::parse("xyz"), None);
    }

    #[test]
    fn test_is_valid_rejects_garbage() {
        assert!(!is_valid("snp", IdPrefix::Snapshot));
        assert!(!is_valid("ses_01hq", IdPrefix::Snapshot));
        assert!(!is_valid("", IdPrefix::Snapshot));
    }
}
