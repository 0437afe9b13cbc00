//! Configuration of a registered project from its foreign module.

use std::sync::Arc;

use crate::core::ForeignModule;
use crate::include::attributes::register_custom_attributes;
use crate::include::build::IncludedBuild;
use crate::include::error::ConfigureError;
use crate::include::identity::IdentityMap;
use crate::include::publish::{dependency_bucket, elements_bucket, ArtifactPublisher};
use crate::include::tasks::{
    declare_build_files, register_build_task, register_info_tasks, wire_cross_project,
    MAVEN_PLUGINS_CONFIGURATION,
};
use crate::include::translate::{plugin_dependencies, DependencyTranslator};
use crate::native::attributes::{JAR, JAVA_API, JAVA_RUNTIME};
use crate::native::plugins::{
    apply_java_base, apply_java_platform, create_source_set, DEFAULT_CONFIGURATION,
};
use crate::native::{Attributes, ModelError, ModuleNotation, Project, SourceSet};

/// Repository every included project resolves external modules from.
pub const MAVEN_CENTRAL: &str = "mavenCentral";

/// Turns a registered, empty project into the native rendition of one
/// foreign module.
pub struct ProjectConfigurer {
    build: Arc<IncludedBuild>,
    module: Arc<ForeignModule>,
    identities: Arc<IdentityMap>,
}

impl ProjectConfigurer {
    pub fn new(
        build: Arc<IncludedBuild>,
        module: Arc<ForeignModule>,
        identities: Arc<IdentityMap>,
    ) -> Self {
        ProjectConfigurer {
            build,
            module,
            identities,
        }
    }

    fn model_error(&self) -> impl Fn(ModelError) -> ConfigureError + '_ {
        move |source| ConfigureError::Model {
            module: self.module.coordinate().to_string(),
            source,
        }
    }

    /// Configure `project`.
    ///
    /// Dependencies are translated before the project is touched, so a
    /// module with an untranslatable dependency leaves its project as it
    /// was.
    pub fn configure(&self, project: &mut Project) -> Result<(), ConfigureError> {
        let module = &self.module;
        let translator = DependencyTranslator::new(module, &self.identities);
        let declarations = if module.is_aggregator() {
            None
        } else {
            Some(translator.translate()?)
        };

        tracing::debug!("Configuring {} from {}", project.path, module.coordinate());
        let model_error = self.model_error();

        apply_java_base(project).map_err(&model_error)?;
        project.group = Some(module.coordinate().group().to_string());
        project.version = Some(module.coordinate().version().to_string());
        if !project.repositories.iter().any(|r| r == MAVEN_CENTRAL) {
            project.repositories.push(MAVEN_CENTRAL.to_string());
        }

        register_info_tasks(project, module).map_err(&model_error)?;
        let build_task = register_build_task(project, &self.build, module).map_err(&model_error)?;

        let plugins = dependency_bucket(
            project,
            "Maven plugins",
            MAVEN_PLUGINS_CONFIGURATION,
            SourceSet::MAIN,
        );
        plugins.visible = true;
        plugins.transitive = true;

        match declarations {
            None => {
                apply_java_platform(project).map_err(&model_error)?;
                let api = project
                    .configuration_mut(&SourceSet::main().api_configuration_name())
                    .map_err(&model_error)?;
                for managed in module.dependency_management() {
                    api.add_constraint(
                        ModuleNotation::new(
                            managed.group(),
                            managed.artifact(),
                            managed.version().map(str::to_string),
                        )
                        .with_classifier(managed.classifier().map(str::to_string)),
                    );
                }
            }
            Some(declarations) => {
                configurations_for_source_sets(project).map_err(&model_error)?;
                translator.apply(declarations, project)?;
                ArtifactPublisher::new(module, build_task).publish(project)?;
                declare_build_files(project, module).map_err(&model_error)?;
            }
        }

        let plugin_deps = plugin_dependencies(module, self.build.index(), &self.identities);
        let plugins = project
            .configuration_mut(MAVEN_PLUGINS_CONFIGURATION)
            .map_err(&model_error)?;
        for dependency in plugin_deps {
            plugins.add_dependency(dependency);
        }

        wire_cross_project(project).map_err(&model_error)?;
        register_custom_attributes(project);
        Ok(())
    }
}

fn set_all(target: &mut Attributes, source: Attributes) {
    for (name, value) in source.iter() {
        target.set(name.clone(), value.clone());
    }
}

/// Create the main and test source sets with the library buckets the
/// foreign scopes are translated into.
pub fn configurations_for_source_sets(project: &mut Project) -> Result<(), ModelError> {
    let main = SourceSet::main();
    let test = SourceSet::test();
    create_source_set(project, &main);
    create_source_set(project, &test);

    let api = main.api_configuration_name();
    let compile_only_api = main.compile_only_api_configuration_name();
    let implementation = main.implementation_configuration_name();
    let compile_only = main.compile_only_configuration_name();
    let runtime_only = main.runtime_only_configuration_name();
    let runtime_elements = main.runtime_elements_configuration_name();
    let test_api = test.api_configuration_name();
    let test_compile_only_api = test.compile_only_api_configuration_name();

    dependency_bucket(project, "API", &api, main.name());
    dependency_bucket(project, "Compile only", &compile_only_api, main.name());

    let api_elements = elements_bucket(
        project,
        "API elements",
        &main.api_elements_configuration_name(),
        JAR,
    );
    set_all(&mut api_elements.attributes, Attributes::library(JAVA_API));
    api_elements.extend_from([api.as_str(), compile_only_api.as_str()]);

    let runtime = elements_bucket(project, "Elements of runtime", &runtime_elements, JAR);
    set_all(&mut runtime.attributes, Attributes::library(JAVA_RUNTIME));
    runtime.extend_from([implementation.as_str(), runtime_only.as_str()]);

    dependency_bucket(project, "Test API", &test_api, test.name());
    dependency_bucket(project, "Test compile only", &test_compile_only_api, test.name());

    project
        .configuration_mut(&implementation)?
        .extend_from([api.as_str()]);
    project
        .configuration_mut(&compile_only)?
        .extend_from([compile_only_api.as_str()]);
    project
        .maybe_create_configuration(DEFAULT_CONFIGURATION)
        .extend_from([runtime_elements.as_str()]);
    project
        .configuration_mut(&test.implementation_configuration_name())?
        .extend_from([test_api.as_str(), implementation.as_str()]);
    project
        .configuration_mut(&test.compile_only_configuration_name())?
        .extend_from([test_compile_only_api.as_str(), compile_only_api.as_str()]);
    project
        .configuration_mut(&test.runtime_only_configuration_name())?
        .extend_from([api.as_str(), runtime_only.as_str()]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ForeignEngine;
    use crate::include::attributes::ARTIFACT_TYPE as MAVEN_ARTIFACT_TYPE;
    use crate::include::config::IncludedBuildConfig;
    use crate::include::discover::GraphDiscoverer;
    use crate::include::tasks::{MAVEN_BUILD_TASK, MAVEN_INFO_TASK};
    use crate::native::graph::resolve_dependencies;
    use crate::native::{
        AttributeValue, BuildModel, DependencyTarget, ProjectPath, TaskDependency, TaskPath,
    };
    use crate::core::{Dependency, Plugin};
    use crate::test_support::*;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        build: Arc<IncludedBuild>,
        identities: Arc<IdentityMap>,
        _tmp: TempDir,
    }

    fn fixture(modules: impl FnOnce(&Path) -> (ForeignModule, Vec<ForeignModule>)) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let (root, modules) = modules(tmp.path());
        let engine: Arc<dyn ForeignEngine> = Arc::new(FakeEngine::new(root, modules));
        let config = IncludedBuildConfig::new("mvn", tmp.path())
            .with_local_repository(tmp.path().join("repo"));
        let build = Arc::new(GraphDiscoverer::new(config, engine).discover().unwrap());

        let mut identities = IdentityMap::new();
        for module in build.reactor() {
            let ga = module.group_artifact();
            identities.insert(ga.clone(), build.config().project_path(&ga).unwrap());
        }
        Fixture {
            build,
            identities: Arc::new(identities),
            _tmp: tmp,
        }
    }

    impl Fixture {
        fn configure(&self, artifact: &str) -> Result<Project, ConfigureError> {
            let module = self
                .build
                .reactor()
                .iter()
                .find(|m| m.coordinate().artifact() == artifact)
                .cloned()
                .unwrap();
            let path = ProjectPath::parse(&format!(":mvn:{}", artifact)).unwrap();
            let mut project = Project::new(path, module.base_dir(), artifact);
            ProjectConfigurer::new(Arc::clone(&self.build), module, Arc::clone(&self.identities))
                .configure(&mut project)?;
            Ok(project)
        }
    }

    #[test]
    fn test_jar_module_buckets() {
        let f = fixture(two_module_build);
        let project = f.configure("b").unwrap();

        assert_eq!(project.group.as_deref(), Some("org.example"));
        assert_eq!(project.repositories, vec![MAVEN_CENTRAL.to_string()]);
        assert!(project.task(MAVEN_BUILD_TASK).is_some());
        assert!(project.task(MAVEN_INFO_TASK).is_some());

        let api = project.configuration("api").unwrap();
        assert_eq!(api.description.as_deref(), Some("API dependencies for main"));
        assert_eq!(
            api.dependencies[1].target,
            DependencyTarget::Project {
                path: ProjectPath::parse(":mvn:a").unwrap()
            }
        );
        assert!(api.dependencies[0].platform);

        let api_elements = project.configuration("apiElements").unwrap();
        assert!(api_elements.can_be_consumed);
        assert_eq!(api_elements.extends_from, vec!["api", "compileOnlyApi"]);
        assert_eq!(
            api_elements.attributes.get("usage"),
            Some(&AttributeValue::from("java-api"))
        );
        assert_eq!(
            api_elements.attributes.get(MAVEN_ARTIFACT_TYPE),
            Some(&AttributeValue::from("jar"))
        );

        let closure: Vec<_> = project
            .extends_closure("testRuntimeClasspath")
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert!(closure.contains(&"api"));
        assert!(closure.contains(&"testApi"));

        let plugins = project.configuration(MAVEN_PLUGINS_CONFIGURATION).unwrap();
        assert!(plugins.visible && plugins.transitive);
        assert_eq!(project.attribute_schema.len(), 6);
    }

    #[test]
    fn test_aggregator_becomes_platform() {
        let f = fixture(|dir| {
            let root = root_module(dir).with_dependency_management(vec![
                Dependency::new("org.junit", "junit-bom", Some("5.10.0".to_string())),
                Dependency::new("org.lib", "lib", Some("2".to_string()))
                    .with_classifier(Some("native".to_string())),
            ]);
            (root.clone(), vec![root])
        });
        let project = f.configure("parent").unwrap();

        assert!(project.has_plugin("java-platform"));
        let api = project.configuration("api").unwrap();
        assert!(api.dependencies.is_empty());
        assert_eq!(api.constraints.len(), 2);
        assert_eq!(api.constraints[1].to_string(), "org.lib:lib:2:native");
        assert!(project.configuration("jarMavenArtifact").is_none());
        assert_eq!(
            project
                .configuration("apiElements")
                .unwrap()
                .attributes
                .get("category"),
            Some(&AttributeValue::from("platform"))
        );
    }

    #[test]
    fn test_unknown_scope_leaves_project_untouched() {
        let f = fixture(|dir| {
            let root = root_module(dir);
            let a = jar_module(dir, "a").with_dependency(
                Dependency::new("com.sun", "tools", Some("1.8".to_string())).with_scope("system"),
            );
            (root.clone(), vec![root, a])
        });
        match f.configure("a") {
            Err(ConfigureError::UnknownScope { module, .. }) => {
                assert_eq!(module, "org.example:a:1.0")
            }
            other => panic!("expected unknown scope, got {:?}", other.map(|p| p.path)),
        }
    }

    #[test]
    fn test_reactor_plugin_goes_to_plugin_bucket() {
        let f = fixture(|dir| {
            let root = root_module(dir);
            let plugin = jar_module(dir, "a");
            let user = jar_module(dir, "b")
                .with_plugin(Plugin::new(GROUP, "a", Some(VERSION.to_string())));
            (root.clone(), vec![root, plugin, user])
        });
        let project = f.configure("b").unwrap();
        let plugins = project.configuration(MAVEN_PLUGINS_CONFIGURATION).unwrap();
        assert_eq!(
            plugins.dependencies[0].project_path(),
            Some(&ProjectPath::parse(":mvn:a").unwrap())
        );
        assert!(project
            .task(MAVEN_BUILD_TASK)
            .unwrap()
            .depends_on
            .contains(&TaskDependency::FromProjectDependencies {
                configuration: MAVEN_PLUGINS_CONFIGURATION.to_string(),
                use_depended_on: true,
                task: MAVEN_BUILD_TASK.to_string(),
            }));
    }

    #[test]
    fn test_maven_build_follows_project_dependencies() {
        let f = fixture(two_module_build);
        let mut model = BuildModel::new(f.build.config().root_directory(), "host");
        for artifact in ["parent", "a", "b"] {
            let project = f.configure(artifact).unwrap();
            let dir = project.dir.clone();
            let slot = model
                .include(project.path.clone(), &dir, artifact)
                .unwrap();
            *slot = project;
        }

        let b_build = TaskPath::parse(":mvn:b:mavenBuild").unwrap();
        let deps = resolve_dependencies(&model, &b_build).unwrap();
        assert!(deps.contains(&TaskPath::parse(":mvn:a:mavenBuild").unwrap()));
        assert!(deps.contains(&TaskPath::parse(":mvn:parent:mavenBuild").unwrap()));

        let dependents = resolve_dependencies(
            &model,
            &TaskPath::parse(":mvn:a:buildDependents").unwrap(),
        )
        .unwrap();
        assert_eq!(
            dependents,
            vec![
                TaskPath::parse(":mvn:a:build").unwrap(),
                TaskPath::parse(":mvn:b:buildDependents").unwrap()
            ]
        );
    }
}
