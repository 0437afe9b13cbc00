//! Artifacts produced by a foreign module.
//!
//! An artifact's declared type decides its file extension, its implied
//! classifier and its language through an `ArtifactHandler`, mirroring the
//! handler table of the foreign build engine. Unknown types fall back to a
//! handler whose extension is the type itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::coordinate::Coordinate;

/// File-level description of an artifact type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandler {
    extension: String,
    classifier: Option<String>,
    language: String,
    packaging: String,
}

impl ArtifactHandler {
    /// Look up the handler for a declared artifact type.
    pub fn for_type(type_: &str) -> Self {
        let (extension, classifier, language, packaging) = match type_ {
            "pom" => ("pom", None, "none", "pom"),
            "jar" => ("jar", None, "java", "jar"),
            "test-jar" => ("jar", Some("tests"), "java", "jar"),
            "maven-plugin" => ("jar", None, "java", "maven-plugin"),
            "ejb" => ("jar", None, "java", "ejb"),
            "ejb-client" => ("jar", Some("client"), "java", "ejb"),
            "war" => ("war", None, "java", "war"),
            "ear" => ("ear", None, "java", "ear"),
            "rar" => ("rar", None, "java", "rar"),
            "java-source" => ("jar", Some("sources"), "java", "java-source"),
            "javadoc" => ("jar", Some("javadoc"), "java", "javadoc"),
            other => (other, None, "none", other),
        };

        ArtifactHandler {
            extension: extension.to_string(),
            classifier: classifier.map(str::to_string),
            language: language.to_string(),
            packaging: packaging.to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Classifier implied by the type, e.g. `tests` for `test-jar`.
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }
}

/// Binary-data kind of an artifact file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// A Java archive.
    Jar,
    /// A compressed archive.
    Zip,
    /// Anything else.
    BinaryData,
}

impl ArtifactKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "jar" => ArtifactKind::Jar,
            "zip" => ArtifactKind::Zip,
            _ => ArtifactKind::BinaryData,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Jar => "jar",
            ArtifactKind::Zip => "zip",
            ArtifactKind::BinaryData => "binary-data",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primary or attached artifact of a foreign module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignArtifact {
    coordinate: Coordinate,
    #[serde(rename = "type")]
    type_: String,
    classifier: Option<String>,
    scope: Option<String>,
    handler: ArtifactHandler,
}

impl ForeignArtifact {
    /// Create an artifact of the given type. The classifier defaults to the
    /// one implied by the type's handler.
    pub fn new(coordinate: Coordinate, type_: impl Into<String>) -> Self {
        let type_ = type_.into();
        let handler = ArtifactHandler::for_type(&type_);
        let classifier = handler.classifier().map(str::to_string);
        ForeignArtifact {
            coordinate,
            type_,
            classifier,
            scope: None,
            handler,
        }
    }

    /// Override the classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Set the scope the artifact was resolved in.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn handler(&self) -> &ArtifactHandler {
        &self.handler
    }

    pub fn extension(&self) -> &str {
        self.handler.extension()
    }

    pub fn kind(&self) -> ArtifactKind {
        ArtifactKind::from_extension(self.extension())
    }

    /// `<type>` or `<type>-<classifier>`.
    pub fn type_and_classifier(&self) -> String {
        match self.classifier {
            Some(ref classifier) => format!("{}-{}", self.type_, classifier),
            None => self.type_.clone(),
        }
    }

    /// File name inside the module's build directory:
    /// `<artifactId>-<version>[-<classifier>].<extension>`.
    pub fn file_name(&self) -> String {
        let mut name = format!(
            "{}-{}",
            self.coordinate.artifact(),
            self.coordinate.version()
        );
        if let Some(ref classifier) = self.classifier {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(self.extension());
        name
    }
}
