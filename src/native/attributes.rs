//! Variant attributes used to select among outgoing buckets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const USAGE: &str = "usage";
pub const CATEGORY: &str = "category";
pub const LIBRARY_ELEMENTS: &str = "library-elements";
pub const BUNDLING: &str = "bundling";
pub const JVM_VERSION: &str = "jvm-version";
pub const JVM_ENVIRONMENT: &str = "jvm-environment";
pub const ARTIFACT_TYPE: &str = "artifact-type";

pub const JAVA_API: &str = "java-api";
pub const JAVA_RUNTIME: &str = "java-runtime";
pub const LIBRARY: &str = "library";
pub const PLATFORM: &str = "platform";
pub const JAR: &str = "jar";
pub const EXTERNAL: &str = "external";
pub const STANDARD_JVM: &str = "standard-jvm";

/// Java release assumed for translated modules.
pub const DEFAULT_JVM_VERSION: u32 = 8;

/// Value of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Named(String),
    Int(u32),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Named(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Named(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Int(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Named(s) => f.write_str(s),
            AttributeValue::Int(n) => write!(f, "{}", n),
        }
    }
}

/// An attribute container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Attributes::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every requested attribute is present here with the same value.
    /// Attributes not mentioned in `requested` are ignored.
    pub fn matches(&self, requested: &Attributes) -> bool {
        requested
            .iter()
            .all(|(name, value)| self.0.get(name) == Some(value))
    }

    /// The attribute set of a library's API or runtime variant.
    pub fn library(usage: &str) -> Self {
        let mut attrs = Attributes::new();
        attrs
            .set(USAGE, usage)
            .set(CATEGORY, LIBRARY)
            .set(LIBRARY_ELEMENTS, JAR)
            .set(BUNDLING, EXTERNAL)
            .set(JVM_VERSION, DEFAULT_JVM_VERSION)
            .set(JVM_ENVIRONMENT, STANDARD_JVM);
        attrs
    }

    /// The attribute set of a platform's API or runtime variant.
    pub fn platform(usage: &str) -> Self {
        let mut attrs = Attributes::new();
        attrs.set(USAGE, usage).set(CATEGORY, PLATFORM);
        attrs
    }
}
