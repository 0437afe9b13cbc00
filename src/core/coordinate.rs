//! Coordinates - the identity of a foreign module or dependency.
//!
//! A `GroupArtifact` is the version-less key used to decide whether a
//! dependency points into the included reactor. A `Coordinate` adds the
//! version and is the unit of uniqueness inside one reactor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `group:artifact` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupArtifact {
    group: String,
    artifact: String,
}

impl GroupArtifact {
    /// Create a new key.
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        GroupArtifact {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parse a `group:artifact` string.
    pub fn parse(key: &str) -> Option<Self> {
        let (group, artifact) = key.split_once(':')?;
        if group.is_empty() || artifact.is_empty() || artifact.contains(':') {
            return None;
        }
        Some(GroupArtifact::new(group, artifact))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }
}

impl fmt::Display for GroupArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// `group:artifact:version` identity of a foreign module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    group: String,
    artifact: String,
    version: String,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Coordinate {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The version-less key of this coordinate.
    pub fn group_artifact(&self) -> GroupArtifact {
        GroupArtifact::new(self.group.clone(), self.artifact.clone())
    }

    /// The `group:artifact:version` key used for duplicate detection.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_artifact() {
        let ga = GroupArtifact::parse("org.example:core").unwrap();
        assert_eq!(ga.group(), "org.example");
        assert_eq!(ga.artifact(), "core");
        assert_eq!(ga.to_string(), "org.example:core");
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        assert!(GroupArtifact::parse("core").is_none());
        assert!(GroupArtifact::parse(":core").is_none());
        assert!(GroupArtifact::parse("org.example:core:1.0").is_none());
    }

    #[test]
    fn test_coordinate_key() {
        let coord = Coordinate::new("org.example", "core", "1.0-SNAPSHOT");
        assert_eq!(coord.key(), "org.example:core:1.0-SNAPSHOT");
        assert_eq!(
            coord.group_artifact(),
            GroupArtifact::new("org.example", "core")
        );
    }
}
