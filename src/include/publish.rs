//! Outgoing variants for the artifacts of a module.

use crate::core::{ForeignArtifact, ForeignModule};
use crate::include::attributes::add_custom_artifact_attributes;
use crate::include::error::ConfigureError;
use crate::native::attributes::ARTIFACT_TYPE;
use crate::native::plugins::SourceSet;
use crate::native::{Capability, Configuration, OutgoingArtifact, Project, TaskPath};
use crate::util::text::to_lower_camel_case;

/// A hidden dependency bucket of `source_set`, created if missing.
pub(crate) fn dependency_bucket<'p>(
    project: &'p mut Project,
    kind: &str,
    name: &str,
    source_set: &str,
) -> &'p mut Configuration {
    project.add_configuration(
        Configuration::bucket(name)
            .hidden()
            .with_description(format!("{} dependencies for {}", kind, source_set)),
    )
}

/// A hidden consumable bucket offering artifacts of `artifact_type`.
pub(crate) fn elements_bucket<'p>(
    project: &'p mut Project,
    kind: &str,
    name: &str,
    artifact_type: &str,
) -> &'p mut Configuration {
    let bucket = dependency_bucket(project, kind, name, SourceSet::MAIN);
    bucket.can_be_consumed = true;
    bucket.attributes.set(ARTIFACT_TYPE, artifact_type);
    bucket
}

/// Publishes the artifacts of one module as outgoing variants.
///
/// Every artifact file is attached lazily: it is produced by `build_task`
/// and need not exist while the model is configured.
pub struct ArtifactPublisher<'a> {
    module: &'a ForeignModule,
    build_task: TaskPath,
}

impl<'a> ArtifactPublisher<'a> {
    pub fn new(module: &'a ForeignModule, build_task: TaskPath) -> Self {
        ArtifactPublisher { module, build_task }
    }

    /// Name of the bucket publishing `artifact`, e.g. `jarTestsMavenArtifact`.
    pub fn bucket_name(artifact: &ForeignArtifact) -> String {
        to_lower_camel_case(&format!("{}-maven-artifact", artifact.type_and_classifier()))
    }

    /// Capability selecting `artifact` among the variants of its module.
    pub fn capability(&self, artifact: &ForeignArtifact) -> Capability {
        let coordinate = self.module.coordinate();
        Capability {
            group: coordinate.group().to_string(),
            name: format!("{}-{}", coordinate.artifact(), artifact.type_and_classifier()),
            version: coordinate.version().to_string(),
        }
    }

    /// Expose the primary jar through the standard elements buckets, then
    /// publish every artifact through a bucket of its own.
    pub fn publish(&self, project: &mut Project) -> Result<(), ConfigureError> {
        let main = SourceSet::main();
        let jar = OutgoingArtifact::from_file(
            self.module.jar_output_file(),
            Some(self.build_task.clone()),
        );

        for name in [
            main.api_elements_configuration_name(),
            main.runtime_elements_configuration_name(),
        ] {
            let bucket = project
                .configuration_mut(&name)
                .map_err(|source| ConfigureError::Model {
                    module: self.module.coordinate().to_string(),
                    source,
                })?;
            bucket.add_artifact(jar.clone());
            add_custom_artifact_attributes(&mut bucket.attributes, self.module.artifact());
        }

        for artifact in self.module.all_artifacts() {
            self.publish_artifact(project, artifact);
        }
        Ok(())
    }

    fn publish_artifact(&self, project: &mut Project, artifact: &ForeignArtifact) {
        let name = Self::bucket_name(artifact);
        tracing::debug!(
            "Publishing {} of {} through '{}'",
            artifact.type_and_classifier(),
            self.module.coordinate(),
            name
        );

        let file = self.module.output_file(artifact);
        let outgoing = OutgoingArtifact {
            name: file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension: artifact.extension().to_string(),
            type_: artifact.type_().to_string(),
            classifier: artifact.classifier().map(str::to_string),
            file,
            built_by: Some(self.build_task.clone()),
        };
        let capability = self.capability(artifact);

        let bucket = elements_bucket(project, artifact.type_(), &name, artifact.kind().as_str());
        bucket.add_artifact(outgoing);
        bucket.add_capability(capability);
        add_custom_artifact_attributes(&mut bucket.attributes, artifact);
    }
}
