//! Conventions of the Java base and Java platform plugins.
//!
//! Only the parts the translated projects rely on are modelled: lifecycle
//! tasks, source-set buckets and the platform variants.

use crate::native::attributes::{Attributes, JAVA_API, JAVA_RUNTIME};
use crate::native::configuration::Configuration;
use crate::native::project::{Project, TaskPath};
use crate::native::task::{Task, TaskDependency};
use crate::native::ModelError;
use crate::util::text::capitalize;

pub const JAVA_BASE_PLUGIN: &str = "java-base";
pub const JAVA_PLATFORM_PLUGIN: &str = "java-platform";

pub const ASSEMBLE_TASK: &str = "assemble";
pub const CHECK_TASK: &str = "check";
pub const BUILD_TASK: &str = "build";
pub const BUILD_NEEDED_TASK: &str = "buildNeeded";
pub const BUILD_DEPENDENTS_TASK: &str = "buildDependents";

pub const DEFAULT_CONFIGURATION: &str = "default";

pub const API_CONFIGURATION: &str = "api";
pub const RUNTIME_CONFIGURATION: &str = "runtime";
pub const API_ELEMENTS_CONFIGURATION: &str = "apiElements";
pub const RUNTIME_ELEMENTS_CONFIGURATION: &str = "runtimeElements";
pub const TEST_RUNTIME_CLASSPATH_CONFIGURATION: &str = "testRuntimeClasspath";

/// A named source set. Bucket names of `main` are unprefixed, every other
/// source set prefixes them with its own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    name: String,
}

impl SourceSet {
    pub const MAIN: &'static str = "main";
    pub const TEST: &'static str = "test";

    pub fn new(name: impl Into<String>) -> Self {
        SourceSet { name: name.into() }
    }

    pub fn main() -> Self {
        SourceSet::new(Self::MAIN)
    }

    pub fn test() -> Self {
        SourceSet::new(Self::TEST)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn configuration_name(&self, base: &str) -> String {
        if self.name == Self::MAIN {
            base.to_string()
        } else {
            format!("{}{}", self.name, capitalize(base))
        }
    }

    pub fn api_configuration_name(&self) -> String {
        self.configuration_name("api")
    }

    pub fn compile_only_api_configuration_name(&self) -> String {
        self.configuration_name("compileOnlyApi")
    }

    pub fn implementation_configuration_name(&self) -> String {
        self.configuration_name("implementation")
    }

    pub fn compile_only_configuration_name(&self) -> String {
        self.configuration_name("compileOnly")
    }

    pub fn runtime_only_configuration_name(&self) -> String {
        self.configuration_name("runtimeOnly")
    }

    pub fn compile_classpath_configuration_name(&self) -> String {
        self.configuration_name("compileClasspath")
    }

    pub fn runtime_classpath_configuration_name(&self) -> String {
        self.configuration_name("runtimeClasspath")
    }

    pub fn api_elements_configuration_name(&self) -> String {
        self.configuration_name("apiElements")
    }

    pub fn runtime_elements_configuration_name(&self) -> String {
        self.configuration_name("runtimeElements")
    }
}

/// Apply the base plugin: lifecycle tasks and the `default` bucket.
pub fn apply_java_base(project: &mut Project) -> Result<(), ModelError> {
    if !project.apply_plugin(JAVA_BASE_PLUGIN) {
        return Ok(());
    }
    let path = project.path.clone();
    let local = |task: &str| TaskDependency::task(TaskPath::new(path.clone(), task));

    project.register_task(
        Task::new(ASSEMBLE_TASK)
            .with_group("build")
            .with_description("Assembles the outputs of this project."),
    )?;
    project.register_task(
        Task::new(CHECK_TASK)
            .with_group("verification")
            .with_description("Runs all checks."),
    )?;
    project
        .register_task(
            Task::new(BUILD_TASK)
                .with_group("build")
                .with_description("Assembles and tests this project."),
        )?
        .depends_on(local(ASSEMBLE_TASK))
        .depends_on(local(CHECK_TASK));
    project
        .register_task(
            Task::new(BUILD_NEEDED_TASK)
                .with_group("build")
                .with_description(
                    "Assembles and tests this project and all projects it depends on.",
                ),
        )?
        .depends_on(local(BUILD_TASK));
    project
        .register_task(
            Task::new(BUILD_DEPENDENTS_TASK)
                .with_group("build")
                .with_description(
                    "Assembles and tests this project and all projects that depend on it.",
                ),
        )?
        .depends_on(local(BUILD_TASK));

    project.add_configuration(
        Configuration::new(DEFAULT_CONFIGURATION)
            .with_description("Configuration for default artifacts."),
    );
    Ok(())
}

/// Create the buckets every source set owns.
pub fn create_source_set(project: &mut Project, source_set: &SourceSet) {
    let implementation = source_set.implementation_configuration_name();
    let compile_only = source_set.compile_only_configuration_name();
    let runtime_only = source_set.runtime_only_configuration_name();
    let name = source_set.name();

    project.add_configuration(
        Configuration::bucket(&implementation)
            .hidden()
            .with_description(format!("Implementation only dependencies for {}.", name)),
    );
    project.add_configuration(
        Configuration::bucket(&compile_only)
            .hidden()
            .with_description(format!("Compile only dependencies for {}.", name)),
    );
    project.add_configuration(
        Configuration::bucket(&runtime_only)
            .hidden()
            .with_description(format!("Runtime only dependencies for {}.", name)),
    );
    project
        .add_configuration(
            Configuration::resolvable(source_set.compile_classpath_configuration_name())
                .hidden()
                .with_description(format!("Compile classpath for {}.", name)),
        )
        .extend_from([compile_only.as_str(), implementation.as_str()]);
    project
        .add_configuration(
            Configuration::resolvable(source_set.runtime_classpath_configuration_name())
                .hidden()
                .with_description(format!("Runtime classpath of {}.", name)),
        )
        .extend_from([runtime_only.as_str(), implementation.as_str()]);
}

/// Apply the platform plugin: constraint buckets and platform variants.
pub fn apply_java_platform(project: &mut Project) -> Result<(), ModelError> {
    apply_java_base(project)?;
    if !project.apply_plugin(JAVA_PLATFORM_PLUGIN) {
        return Ok(());
    }

    project.add_configuration(
        Configuration::bucket(API_CONFIGURATION)
            .with_description("API dependencies for the platform."),
    );
    project
        .add_configuration(
            Configuration::bucket(RUNTIME_CONFIGURATION)
                .with_description("Runtime dependencies for the platform."),
        )
        .extend_from([API_CONFIGURATION]);

    let api_elements = project
        .add_configuration(Configuration::consumable(API_ELEMENTS_CONFIGURATION).hidden());
    api_elements.attributes = Attributes::platform(JAVA_API);
    api_elements.extend_from([API_CONFIGURATION]);

    let runtime_elements = project
        .add_configuration(Configuration::consumable(RUNTIME_ELEMENTS_CONFIGURATION).hidden());
    runtime_elements.attributes = Attributes::platform(JAVA_RUNTIME);
    runtime_elements.extend_from([RUNTIME_CONFIGURATION]);

    project
        .maybe_create_configuration(DEFAULT_CONFIGURATION)
        .extend_from([RUNTIME_ELEMENTS_CONFIGURATION]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::attributes::{AttributeValue, CATEGORY, PLATFORM};
    use crate::native::project::ProjectPath;

    fn project() -> Project {
        Project::new(ProjectPath::parse(":b:core").unwrap(), "/w/core", "core")
    }

    #[test]
    fn test_source_set_names() {
        let main = SourceSet::main();
        let test = SourceSet::test();
        assert_eq!(main.api_configuration_name(), "api");
        assert_eq!(test.api_configuration_name(), "testApi");
        assert_eq!(test.compile_only_configuration_name(), "testCompileOnly");
        assert_eq!(
            test.runtime_classpath_configuration_name(),
            TEST_RUNTIME_CLASSPATH_CONFIGURATION
        );
        assert_eq!(main.runtime_elements_configuration_name(), RUNTIME_ELEMENTS_CONFIGURATION);
    }

    #[test]
    fn test_java_base_lifecycle() {
        let mut p = project();
        apply_java_base(&mut p).unwrap();
        apply_java_base(&mut p).unwrap();

        let build = p.task(BUILD_TASK).unwrap();
        assert_eq!(build.depends_on.len(), 2);
        assert!(p.task(BUILD_DEPENDENTS_TASK).is_some());
        assert!(p.configuration(DEFAULT_CONFIGURATION).is_some());
    }

    #[test]
    fn test_source_set_classpaths() {
        let mut p = project();
        create_source_set(&mut p, &SourceSet::test());
        let cp = p.configuration(TEST_RUNTIME_CLASSPATH_CONFIGURATION).unwrap();
        assert!(cp.can_be_resolved);
        assert_eq!(cp.extends_from, vec!["testRuntimeOnly", "testImplementation"]);
    }

    #[test]
    fn test_platform_variants() {
        let mut p = project();
        apply_java_platform(&mut p).unwrap();
        let elements = p.configuration(API_ELEMENTS_CONFIGURATION).unwrap();
        assert!(elements.can_be_consumed);
        assert_eq!(
            elements.attributes.get(CATEGORY),
            Some(&AttributeValue::from(PLATFORM))
        );
        assert!(p.has_plugin(JAVA_BASE_PLUGIN));
    }
}
