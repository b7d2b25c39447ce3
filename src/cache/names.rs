//! Versioned partition names
//!
//! Every logical partition lives under `<kind>-<version>`. Bumping the
//! version makes the next activation evict all partitions of the previous
//! version.

/// Logical cache partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    /// Application shell
    Static,
    /// Everything that is neither shell, image nor API
    Dynamic,
    Images,
    Api,
}

impl PartitionKind {
    pub const ALL: [PartitionKind; 4] = [
        PartitionKind::Static,
        PartitionKind::Dynamic,
        PartitionKind::Images,
        PartitionKind::Api,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PartitionKind::Static => "static",
            PartitionKind::Dynamic => "dynamic",
            PartitionKind::Images => "images",
            PartitionKind::Api => "api",
        }
    }
}

/// The current set of partition names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    version: String,
}

impl CacheNames {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Name of the live partition for `kind`
    pub fn name(&self, kind: PartitionKind) -> String {
        format!("{}-{}", kind.label(), self.version)
    }

    /// All live partition names
    pub fn all(&self) -> Vec<String> {
        PartitionKind::ALL.iter().map(|kind| self.name(*kind)).collect()
    }

    /// `true` when `name` belongs to the current version set
    pub fn is_current(&self, name: &str) -> bool {
        PartitionKind::ALL.iter().any(|kind| self.name(*kind) == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_carry_version() {
        let names = CacheNames::new("v1");
        assert_eq!(names.name(PartitionKind::Static), "static-v1");
        assert_eq!(names.all(), vec!["static-v1", "dynamic-v1", "images-v1", "api-v1"]);
    }

    #[test]
    fn test_previous_version_is_not_current() {
        let names = CacheNames::new("v2");
        assert!(names.is_current("api-v2"));
        assert!(!names.is_current("api-v1"));
        assert!(!names.is_current("thumbnails-v2"));
    }
}
