//! Custom attributes describing the foreign artifact behind a variant.

use crate::core::ForeignArtifact;
use crate::native::{Attributes, Project};

pub const ARTIFACT_TYPE: &str = "maven.artifact.type";
pub const ARTIFACT_CLASSIFIER: &str = "maven.artifact.classifier";
pub const ARTIFACT_SCOPE: &str = "maven.artifact.scope";
pub const ARTIFACT_EXTENSION: &str = "maven.artifact.extension";
pub const ARTIFACT_LANGUAGE: &str = "maven.artifact.language";
pub const ARTIFACT_PACKAGING: &str = "maven.artifact.packaging";

/// Every custom attribute, in schema order.
pub const CUSTOM_ATTRIBUTES: &[&str] = &[
    ARTIFACT_TYPE,
    ARTIFACT_CLASSIFIER,
    ARTIFACT_SCOPE,
    ARTIFACT_EXTENSION,
    ARTIFACT_LANGUAGE,
    ARTIFACT_PACKAGING,
];

/// Describe `artifact` in `attributes`. Absent values are left unset.
pub fn add_custom_artifact_attributes(attributes: &mut Attributes, artifact: &ForeignArtifact) {
    let handler = artifact.handler();
    let values = [
        (ARTIFACT_TYPE, Some(artifact.type_())),
        (ARTIFACT_CLASSIFIER, artifact.classifier()),
        (ARTIFACT_SCOPE, artifact.scope()),
        (ARTIFACT_EXTENSION, Some(handler.extension())),
        (ARTIFACT_LANGUAGE, Some(handler.language())),
        (ARTIFACT_PACKAGING, Some(handler.packaging())),
    ];
    for (name, value) in values {
        if let Some(value) = value {
            attributes.set(name, value);
        }
    }
}

/// Make the custom attributes known to `project`.
pub fn register_custom_attributes(project: &mut Project) {
    project
        .attribute_schema
        .extend(CUSTOM_ATTRIBUTES.iter().map(|a| a.to_string()));
}
