//! Dependency declarations of a foreign module.
//!
//! The declared scope is kept verbatim. It is only interpreted when the
//! dependency is translated, so that an unrecognized value fails the
//! configuration of the owning module and not the whole discovery.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::coordinate::GroupArtifact;

/// Scope used when a descriptor declares none.
pub const DEFAULT_SCOPE: &str = "compile";

/// Type used when a descriptor declares none.
pub const DEFAULT_TYPE: &str = "jar";

/// Wildcard used in exclusion rules.
pub const WILDCARD: &str = "*";

/// Visibility class of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Runtime,
    Provided,
    Test,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scope value outside of compile/runtime/provided/test.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dependency scope `{0}`")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// An exclusion rule. Either side may be the `*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    group: String,
    artifact: String,
}

impl Exclusion {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Exclusion {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// `*:*` excludes every transitive dependency of the edge.
    pub fn is_wildcard(&self) -> bool {
        self.group == WILDCARD && self.artifact == WILDCARD
    }

    /// Group to exclude, `None` meaning any group.
    pub fn group_filter(&self) -> Option<&str> {
        (self.group != WILDCARD).then_some(self.group.as_str())
    }

    /// Artifact to exclude, `None` meaning any artifact.
    pub fn artifact_filter(&self) -> Option<&str> {
        (self.artifact != WILDCARD).then_some(self.artifact.as_str())
    }
}

/// A dependency as declared (and inherited) by a foreign module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    group: String,
    artifact: String,
    version: Option<String>,
    classifier: Option<String>,
    #[serde(rename = "type")]
    type_: String,
    scope: String,
    optional: bool,
    exclusions: Vec<Exclusion>,
}

impl Dependency {
    /// Create a `compile` scoped `jar` dependency.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Dependency {
            group: group.into(),
            artifact: artifact.into(),
            version,
            classifier: None,
            type_: DEFAULT_TYPE.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            optional: false,
            exclusions: Vec::new(),
        }
    }

    /// Set the declared scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the declared type.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = type_.into();
        self
    }

    /// Set the classifier.
    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Mark the dependency optional.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Add an exclusion rule.
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// The scope exactly as declared.
    pub fn declared_scope(&self) -> &str {
        &self.scope
    }

    /// The interpreted scope.
    pub fn scope(&self) -> Result<Scope, UnknownScope> {
        self.scope.parse()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// Whether this edge imports a descriptor-only (`pom`) artifact.
    pub fn is_pom(&self) -> bool {
        self.type_ == "pom"
    }

    pub fn group_artifact(&self) -> GroupArtifact {
        GroupArtifact::new(self.group.clone(), self.artifact.clone())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(ref version) = self.version {
            write!(f, ":{}", version)?;
        }
        if let Some(ref classifier) = self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("compile".parse::<Scope>().unwrap(), Scope::Compile);
        assert_eq!("provided".parse::<Scope>().unwrap(), Scope::Provided);
        assert_eq!(
            "system".parse::<Scope>().unwrap_err(),
            UnknownScope("system".to_string())
        );
    }

    #[test]
    fn test_dependency_defaults() {
        let dep = Dependency::new("org.example", "core", Some("1.0".into()));
        assert_eq!(dep.declared_scope(), "compile");
        assert_eq!(dep.type_(), "jar");
        assert!(!dep.is_optional());
        assert!(!dep.is_pom());
        assert_eq!(dep.to_string(), "org.example:core:1.0");
    }

    #[test]
    fn test_exclusion_filters() {
        let all = Exclusion::new("*", "*");
        assert!(all.is_wildcard());

        let any_group = Exclusion::new("*", "guava");
        assert!(!any_group.is_wildcard());
        assert_eq!(any_group.group_filter(), None);
        assert_eq!(any_group.artifact_filter(), Some("guava"));
    }
}
