//! Translation of module dependencies into bucket declarations.
//!
//! Translation is split in two: [`DependencyTranslator::translate`] computes
//! every declaration of a module without touching the project, and
//! [`DependencyTranslator::apply`] adds them. A dependency that cannot be
//! translated therefore leaves the project without any of them.

use std::fmt;

use crate::core::{Coordinate, Dependency, ForeignModule, ModuleIndex, Scope};
use crate::include::error::ConfigureError;
use crate::include::identity::IdentityMap;
use crate::native::plugins::SourceSet;
use crate::native::{DependencyDecl, ExcludeRule, ModuleNotation, Project};

/// A dependency declaration targeted at a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub configuration: String,
    pub dependency: DependencyDecl,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.configuration, self.dependency)
    }
}

/// Translates the dependencies of one module.
pub struct DependencyTranslator<'a> {
    module: &'a ForeignModule,
    identities: &'a IdentityMap,
    main: SourceSet,
    test: SourceSet,
}

impl<'a> DependencyTranslator<'a> {
    pub fn new(module: &'a ForeignModule, identities: &'a IdentityMap) -> Self {
        DependencyTranslator {
            module,
            identities,
            main: SourceSet::main(),
            test: SourceSet::test(),
        }
    }

    /// All declarations of the module: the parent chain first, nearest
    /// parent leading, then every dependency in declaration order.
    pub fn translate(&self) -> Result<Vec<Declaration>, ConfigureError> {
        let mut declarations: Vec<Declaration> = self
            .module
            .parents()
            .iter()
            .map(|parent| Declaration {
                configuration: self.main.api_configuration_name(),
                dependency: self.parent_reference(parent).into_platform(),
            })
            .collect();

        for dependency in self.module.dependencies() {
            declarations.push(self.dependency(dependency)?);
        }
        Ok(declarations)
    }

    /// Add `declarations` to their buckets in `project`.
    pub fn apply(
        &self,
        declarations: Vec<Declaration>,
        project: &mut Project,
    ) -> Result<(), ConfigureError> {
        for declaration in declarations {
            tracing::debug!("Adding {} to {}", declaration, project.path);
            project
                .configuration_mut(&declaration.configuration)
                .map_err(|source| ConfigureError::Model {
                    module: self.module.coordinate().to_string(),
                    source,
                })?
                .add_dependency(declaration.dependency);
        }
        Ok(())
    }

    fn dependency(&self, dependency: &Dependency) -> Result<Declaration, ConfigureError> {
        let scope = dependency
            .scope()
            .map_err(|e| ConfigureError::UnknownScope {
                scope: e.0,
                dependency: dependency.to_string(),
                module: self.module.coordinate().to_string(),
            })?;

        let mut translated = self.reference(dependency);
        if dependency.exclusions().iter().any(|e| e.is_wildcard()) {
            translated = translated.with_transitive(false);
        } else {
            for exclusion in dependency.exclusions() {
                translated = translated.with_exclude(ExcludeRule {
                    group: exclusion.group_filter().map(str::to_string),
                    module: exclusion.artifact_filter().map(str::to_string),
                });
            }
        }

        Ok(Declaration {
            configuration: self.bucket(scope, dependency.is_optional()),
            dependency: translated,
        })
    }

    /// Bucket receiving a dependency of `scope`.
    pub fn bucket(&self, scope: Scope, optional: bool) -> String {
        match (scope, optional) {
            (Scope::Compile, false) => self.main.api_configuration_name(),
            (Scope::Compile, true) => self.main.compile_only_configuration_name(),
            (Scope::Runtime, _) | (Scope::Provided, _) => {
                self.main.runtime_only_configuration_name()
            }
            (Scope::Test, false) => self.test.api_configuration_name(),
            (Scope::Test, true) => self.test.compile_only_configuration_name(),
        }
    }

    /// A project reference if the target is included, whatever version is
    /// requested, an external reference otherwise. `pom` typed targets only
    /// contribute their constraints.
    fn reference(&self, dependency: &Dependency) -> DependencyDecl {
        let reference = match self.identities.get(&dependency.group_artifact()) {
            Some(path) => DependencyDecl::project(path.clone()),
            None => DependencyDecl::module(
                ModuleNotation::new(
                    dependency.group(),
                    dependency.artifact(),
                    dependency.version().map(str::to_string),
                )
                .with_classifier(dependency.classifier().map(str::to_string)),
            ),
        };
        if dependency.is_pom() {
            reference.into_platform()
        } else {
            reference
        }
    }

    fn parent_reference(&self, parent: &Coordinate) -> DependencyDecl {
        match self.identities.get(&parent.group_artifact()) {
            Some(path) => DependencyDecl::project(path.clone()),
            None => DependencyDecl::module(ModuleNotation::new(
                parent.group(),
                parent.artifact(),
                Some(parent.version().to_string()),
            )),
        }
    }
}

/// Project references for the build plugins of `module` that are built in
/// the same reactor, and for plugin dependencies that are. Only modules
/// with exactly the requested version count.
pub fn plugin_dependencies(
    module: &ForeignModule,
    index: &ModuleIndex,
    identities: &IdentityMap,
) -> Vec<DependencyDecl> {
    tracing::debug!(
        "Handling dependencies of {} plugins in {}",
        module.plugins().len(),
        module.coordinate()
    );

    let mut declarations = Vec::new();
    let mut add = |ga: &crate::core::GroupArtifact, version: Option<&str>| {
        if index.get_version(ga, version).is_none() {
            return;
        }
        if let Some(path) = identities.get(ga) {
            let decl = DependencyDecl::project(path.clone());
            if !declarations.contains(&decl) {
                declarations.push(decl);
            }
        }
    };

    for plugin in module.plugins() {
        let ga = plugin.group_artifact();
        tracing::debug!("Adding plugin build dependency for {} to {}", ga, module.coordinate());
        add(&ga, plugin.version());
        for dependency in plugin.dependencies() {
            add(&dependency.group_artifact(), dependency.version());
        }
    }
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Exclusion, Plugin};
    use crate::native::{Configuration, DependencyTarget, ProjectPath};
    use crate::test_support::*;
    use std::path::Path;
    use std::sync::Arc;

    fn identities() -> IdentityMap {
        let mut map = IdentityMap::new();
        for artifact in ["parent", "a", "b"] {
            map.insert(
                coordinate(artifact).group_artifact(),
                ProjectPath::parse(&format!(":mvn:{}", artifact)).unwrap(),
            );
        }
        map
    }

    fn module() -> ForeignModule {
        jar_module(Path::new("/w"), "b")
    }

    fn translate(module: &ForeignModule) -> Vec<Declaration> {
        let ids = identities();
        DependencyTranslator::new(module, &ids).translate().unwrap()
    }

    fn external(group: &str, artifact: &str) -> Dependency {
        Dependency::new(group, artifact, Some("1.2".to_string()))
    }

    #[test]
    fn test_scope_buckets() {
        let m = module()
            .with_dependency(external("x", "compile-dep"))
            .with_dependency(external("x", "optional-dep").optional(true))
            .with_dependency(external("x", "runtime-dep").with_scope("runtime"))
            .with_dependency(external("x", "provided-dep").with_scope("provided"))
            .with_dependency(external("x", "test-dep").with_scope("test"))
            .with_dependency(external("x", "optional-test-dep").with_scope("test").optional(true));

        let buckets: Vec<_> = translate(&m)
            .into_iter()
            .skip(1)
            .map(|d| d.configuration)
            .collect();
        assert_eq!(
            buckets,
            vec!["api", "compileOnly", "runtimeOnly", "runtimeOnly", "testApi", "testCompileOnly"]
        );
    }

    #[test]
    fn test_wildcard_exclusion_only_affects_its_edge() {
        let m = module()
            .with_dependency(external("x", "one").with_exclusion(Exclusion::new("*", "*")))
            .with_dependency(external("x", "two").with_exclusion(Exclusion::new("org.bad", "*")));

        let decls = translate(&m);
        assert!(!decls[1].dependency.transitive);
        assert!(decls[1].dependency.excludes.is_empty());

        assert!(decls[2].dependency.transitive);
        assert_eq!(
            decls[2].dependency.excludes,
            vec![ExcludeRule {
                group: Some("org.bad".to_string()),
                module: None,
            }]
        );
    }

    #[test]
    fn test_included_targets_become_project_references() {
        let m = module()
            .with_dependency(dependency("a", "compile"))
            .with_dependency(Dependency::new(GROUP, "a", Some("0.9".to_string())))
            .with_dependency(Dependency::new(GROUP, "a", None).with_scope("test"));

        for decl in translate(&m).into_iter().skip(1) {
            assert_eq!(
                decl.dependency.target,
                DependencyTarget::Project {
                    path: ProjectPath::parse(":mvn:a").unwrap()
                }
            );
        }
    }

    #[test]
    fn test_pom_dependencies_are_platforms() {
        let m = module().with_dependency(external("org.bom", "bom").with_type("pom"));
        let decls = translate(&m);
        assert!(decls[1].dependency.platform);
        assert_eq!(decls[1].configuration, "api");
    }

    #[test]
    fn test_parents_nearest_first() {
        let m = module().with_parents(vec![
            coordinate("a"),
            Coordinate::new("org.corp", "corp-parent", "7"),
        ]);
        let decls = translate(&m);
        assert_eq!(decls.len(), 2);
        assert!(decls.iter().all(|d| d.dependency.platform && d.configuration == "api"));
        assert_eq!(
            decls[0].dependency.project_path(),
            Some(&ProjectPath::parse(":mvn:a").unwrap())
        );
        assert_eq!(
            decls[1].dependency.target,
            DependencyTarget::Module(ModuleNotation::new(
                "org.corp",
                "corp-parent",
                Some("7".to_string())
            ))
        );
    }

    #[test]
    fn test_unknown_scope_registers_nothing() {
        let m = module()
            .with_dependency(external("x", "fine"))
            .with_dependency(external("com.sun", "tools").with_scope("system"));
        let ids = identities();
        let translator = DependencyTranslator::new(&m, &ids);

        match translator.translate() {
            Err(ConfigureError::UnknownScope { scope, module, .. }) => {
                assert_eq!(scope, "system");
                assert_eq!(module, "org.example:b:1.0");
            }
            other => panic!("expected unknown scope, got {:?}", other),
        }

        let mut project = Project::new(ProjectPath::parse(":mvn:b").unwrap(), "/w/b", "b");
        project.add_configuration(Configuration::bucket("api"));
        if let Ok(decls) = translator.translate() {
            translator.apply(decls, &mut project).unwrap();
        }
        assert!(project.configuration("api").unwrap().dependencies.is_empty());
    }

    #[test]
    fn test_apply_adds_to_buckets() {
        let m = module().with_dependency(dependency("a", "test"));
        let ids = identities();
        let translator = DependencyTranslator::new(&m, &ids);

        let mut project = Project::new(ProjectPath::parse(":mvn:b").unwrap(), "/w/b", "b");
        project.add_configuration(Configuration::bucket("api"));
        project.add_configuration(Configuration::bucket("testApi"));
        translator
            .apply(translator.translate().unwrap(), &mut project)
            .unwrap();

        assert_eq!(project.configuration("api").unwrap().dependencies.len(), 1);
        assert_eq!(
            project.configuration("testApi").unwrap().dependencies[0].project_path(),
            Some(&ProjectPath::parse(":mvn:a").unwrap())
        );
    }

    #[test]
    fn test_apply_fails_on_missing_bucket() {
        let m = module();
        let ids = identities();
        let translator = DependencyTranslator::new(&m, &ids);
        let mut project = Project::new(ProjectPath::parse(":mvn:b").unwrap(), "/w/b", "b");
        let err = translator
            .apply(translator.translate().unwrap(), &mut project)
            .unwrap_err();
        assert!(matches!(err, ConfigureError::Model { .. }));
    }

    #[test]
    fn test_plugin_dependencies_need_matching_version() {
        let root = root_module(Path::new("/w"));
        let plugin_module = jar_module(Path::new("/w"), "a");
        let index = ModuleIndex::build(vec![Arc::new(root), Arc::new(plugin_module)]).unwrap();

        let m = module()
            .with_plugin(Plugin::new(GROUP, "a", Some(VERSION.to_string())))
            .with_plugin(
                Plugin::new("org.apache.maven.plugins", "maven-compiler-plugin", None)
                    .with_dependency(Dependency::new(GROUP, "parent", Some("0.1".to_string()))),
            );
        let decls = plugin_dependencies(&m, &index, &identities());
        assert_eq!(
            decls,
            vec![DependencyDecl::project(ProjectPath::parse(":mvn:a").unwrap())]
        );
    }
}
