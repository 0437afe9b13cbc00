//! Tasks of included projects and the edges between them.
//!
//! Each module gets a `mavenBuild` task running the configured goals for
//! exactly that module, plus two informational tasks. Once every project is
//! configured, the lifecycle tasks are wired across the native dependency
//! graph so `buildNeeded` and `buildDependents` work without any knowledge
//! of the foreign build.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;

use crate::core::ForeignModule;
use crate::include::build::IncludedBuild;
use crate::include::error::ExecutionError;
use crate::native::plugins::{
    BUILD_DEPENDENTS_TASK, BUILD_NEEDED_TASK, BUILD_TASK, TEST_RUNTIME_CLASSPATH_CONFIGURATION,
};
use crate::native::{ModelError, Project, Task, TaskAction, TaskDependency, TaskPath, SourceSet};

pub const MAVEN_BUILD_TASK: &str = "mavenBuild";
pub const MAVEN_INFO_TASK: &str = "mavenInfo";
pub const MAVEN_POM_DUMP_TASK: &str = "mavenPomDump";
pub const MAVEN_TASKS_GROUP: &str = "include-maven";
pub const MAVEN_PLUGINS_CONFIGURATION: &str = "mavenPlugins";

/// Run the configured goals of `build` for `module` alone.
///
/// The session is derived from the discovery session and restricted to the
/// module; the engine's session scope is entered for the single execution
/// and left again on every path.
pub fn execute_module_build(
    build: &IncludedBuild,
    module: &Arc<ForeignModule>,
    properties: &BTreeMap<String, String>,
) -> Result<(), ExecutionError> {
    let discovery = build.discovery_session();
    let mut request = discovery.request.clone();
    request.goals = build.config().goals().to_vec();
    request.recursive = false;
    request.show_errors = true;
    request.selected_projects = vec![module.group_artifact().to_string()];
    request
        .user_properties
        .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));

    tracing::info!(
        "Executing {} of '{}'",
        request.goals.join(" "),
        module.coordinate()
    );

    let session = discovery.for_module(request, Arc::clone(module));
    let result = {
        let scoped = build.engine().session_scope().enter(session);
        build.engine().execute_goals(&scoped)
    };

    let mut exceptions = result.exceptions.into_iter();
    match exceptions.next() {
        None => Ok(()),
        Some(cause) => Err(ExecutionError::BuildFailure {
            module: module.group_artifact().to_string(),
            cause,
            suppressed: exceptions.collect(),
        }),
    }
}

/// Action of the `mavenBuild` task.
pub struct MavenBuildAction {
    build: Arc<IncludedBuild>,
    module: Arc<ForeignModule>,
    properties: BTreeMap<String, String>,
}

impl MavenBuildAction {
    pub fn new(build: Arc<IncludedBuild>, module: Arc<ForeignModule>) -> Self {
        MavenBuildAction {
            build,
            module,
            properties: BTreeMap::new(),
        }
    }

    /// Extra user properties for this task only.
    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }
}

impl TaskAction for MavenBuildAction {
    fn execute(&self, _task: &TaskPath) -> anyhow::Result<()> {
        execute_module_build(&self.build, &self.module, &self.properties)?;
        Ok(())
    }
}

impl std::fmt::Debug for MavenBuildAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MavenBuildAction")
            .field("build", &self.build.name())
            .field("module", &self.module.coordinate())
            .field("properties", &self.properties)
            .finish()
    }
}

fn report_header(module: &ForeignModule) -> String {
    let title = format!(
        "Maven POM of {} from {}",
        module.coordinate(),
        module.descriptor().display()
    );
    let rule = "-".repeat(title.chars().count());
    format!("{}\n{}\n\n", title, rule)
}

/// Identity and locations of `module`, as printed by `mavenInfo`.
pub fn info_report(module: &ForeignModule) -> String {
    let coordinate = module.coordinate();
    let mut out = report_header(module);
    let _ = writeln!(out, "ID:          {}", coordinate);
    let _ = writeln!(out, "Group ID:    {}", coordinate.group());
    let _ = writeln!(out, "Artifact ID: {}", coordinate.artifact());
    let _ = writeln!(out, "Version:     {}", coordinate.version());
    let _ = writeln!(out, "Packaging:   {}", module.packaging());
    let _ = writeln!(out, "POM:         {}", module.descriptor().display());
    let _ = writeln!(out, "Jar file:    {}", module.jar_output_file().display());
    let _ = writeln!(out, "Base dir:    {}", module.base_dir().display());
    out
}

/// The descriptor text of `module`, as printed by `mavenPomDump`.
pub fn pom_dump(module: &ForeignModule) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(module.descriptor())
        .with_context(|| format!("failed to read {}", module.descriptor().display()))?;
    Ok(format!("{}{}", report_header(module), content))
}

#[derive(Debug)]
struct MavenInfoAction(Arc<ForeignModule>);

impl TaskAction for MavenInfoAction {
    fn execute(&self, _task: &TaskPath) -> anyhow::Result<()> {
        print!("{}", info_report(&self.0));
        Ok(())
    }
}

#[derive(Debug)]
struct PomDumpAction(Arc<ForeignModule>);

impl TaskAction for PomDumpAction {
    fn execute(&self, _task: &TaskPath) -> anyhow::Result<()> {
        print!("{}", pom_dump(&self.0)?);
        Ok(())
    }
}

/// Register `mavenInfo` and `mavenPomDump`.
pub fn register_info_tasks(
    project: &mut Project,
    module: &Arc<ForeignModule>,
) -> Result<(), ModelError> {
    project.register_task(
        Task::new(MAVEN_INFO_TASK)
            .with_group(MAVEN_TASKS_GROUP)
            .with_description(format!("Shows information about Maven project {}", module.coordinate()))
            .with_action(Arc::new(MavenInfoAction(Arc::clone(module)))),
    )?;
    project.register_task(
        Task::new(MAVEN_POM_DUMP_TASK)
            .with_group(MAVEN_TASKS_GROUP)
            .with_description(format!("Prints the POM of Maven project {}", module.coordinate()))
            .with_action(Arc::new(PomDumpAction(Arc::clone(module)))),
    )?;
    Ok(())
}

/// Register `mavenBuild` for `module` and make `build` depend on it.
pub fn register_build_task(
    project: &mut Project,
    build: &Arc<IncludedBuild>,
    module: &Arc<ForeignModule>,
) -> Result<TaskPath, ModelError> {
    let goals = build.config().goals().join(", ");
    let action = MavenBuildAction::new(Arc::clone(build), Arc::clone(module));
    project.register_task(
        Task::new(MAVEN_BUILD_TASK)
            .with_group("build")
            .with_description(format!(
                "Builds Maven project {} using {}",
                module.group_artifact(),
                goals
            ))
            .with_action(Arc::new(action)),
    )?;

    let path = TaskPath::new(project.path.clone(), MAVEN_BUILD_TASK);
    project
        .task_mut(BUILD_TASK)?
        .depends_on(TaskDependency::task(path.clone()));
    Ok(path)
}

/// Declare what `mavenBuild` reads and produces: the descriptor and source
/// roots in, the jar and every artifact file out.
pub fn declare_build_files(project: &mut Project, module: &ForeignModule) -> Result<(), ModelError> {
    let layout = module.build();
    let task = project.task_mut(MAVEN_BUILD_TASK)?;

    task.inputs.push(module.descriptor().to_path_buf());
    task.inputs.extend(layout.source_roots.iter().cloned());
    task.inputs.extend(layout.test_source_roots.iter().cloned());

    let outputs = std::iter::once(module.jar_output_file())
        .chain(module.all_artifacts().map(|a| module.output_file(a)));
    for output in outputs {
        if !task.outputs.contains(&output) {
            task.outputs.push(output);
        }
    }
    Ok(())
}

/// Wire the lifecycle tasks of `project` across project dependencies.
///
/// `mavenBuild` runs after the `mavenBuild` of every project reachable
/// through the plugin, elements and test runtime buckets. `buildNeeded`
/// follows the test runtime classpath forward, `buildDependents` backward.
pub fn wire_cross_project(project: &mut Project) -> Result<(), ModelError> {
    let main = SourceSet::main();
    let buckets = [
        MAVEN_PLUGINS_CONFIGURATION.to_string(),
        main.api_elements_configuration_name(),
        main.runtime_elements_configuration_name(),
        TEST_RUNTIME_CLASSPATH_CONFIGURATION.to_string(),
    ];
    let present: Vec<String> = buckets
        .into_iter()
        .filter(|name| project.configuration(name).is_some())
        .collect();

    let maven_build = project.task_mut(MAVEN_BUILD_TASK)?;
    for configuration in present {
        maven_build.depends_on(TaskDependency::FromProjectDependencies {
            configuration,
            use_depended_on: true,
            task: MAVEN_BUILD_TASK.to_string(),
        });
    }

    if project.configuration(TEST_RUNTIME_CLASSPATH_CONFIGURATION).is_none() {
        return Ok(());
    }
    project
        .task_mut(BUILD_NEEDED_TASK)?
        .depends_on(TaskDependency::FromProjectDependencies {
            configuration: TEST_RUNTIME_CLASSPATH_CONFIGURATION.to_string(),
            use_depended_on: true,
            task: BUILD_NEEDED_TASK.to_string(),
        });
    project
        .task_mut(BUILD_DEPENDENTS_TASK)?
        .depends_on(TaskDependency::FromProjectDependencies {
            configuration: TEST_RUNTIME_CLASSPATH_CONFIGURATION.to_string(),
            use_depended_on: false,
            task: BUILD_DEPENDENTS_TASK.to_string(),
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, ForeignEngine};
    use crate::include::config::IncludedBuildConfig;
    use crate::include::discover::GraphDiscoverer;
    use crate::native::plugins::apply_java_base;
    use crate::native::ProjectPath;
    use crate::test_support::*;
    use tempfile::TempDir;

    fn discover(engine: Arc<FakeEngine>, dir: &std::path::Path) -> Arc<IncludedBuild> {
        let config = IncludedBuildConfig::new("mvn", dir).with_local_repository(dir.join("repo"));
        let engine: Arc<dyn ForeignEngine> = engine;
        Arc::new(GraphDiscoverer::new(config, engine).discover().unwrap())
    }

    fn module_b(build: &IncludedBuild) -> Arc<ForeignModule> {
        Arc::clone(build.reactor().iter().find(|m| m.coordinate().artifact() == "b").unwrap())
    }

    #[test]
    fn test_module_build_selects_only_the_module() {
        let tmp = TempDir::new().unwrap();
        let (root, modules) = two_module_build(tmp.path());
        let engine = Arc::new(FakeEngine::new(root, modules));
        let build = discover(Arc::clone(&engine), tmp.path());

        let mut properties = BTreeMap::new();
        properties.insert("skipTests".to_string(), "true".to_string());
        MavenBuildAction::new(Arc::clone(&build), module_b(&build))
            .with_properties(properties)
            .execute(&TaskPath::parse(":mvn:b:mavenBuild").unwrap())
            .unwrap();

        let executions = engine.executions();
        assert_eq!(executions.len(), 1);
        let run = &executions[0];
        assert_eq!(run.selected_projects, vec!["org.example:b".to_string()]);
        assert_eq!(run.projects, vec!["org.example:b".to_string()]);
        assert_eq!(run.goals, vec!["package".to_string()]);
        assert!(!run.recursive);
        assert_eq!(run.user_properties.get("skipTests").map(String::as_str), Some("true"));
        assert_eq!(run.active_scopes, 1);
        assert_eq!(engine.session_scope().active(), 0);
    }

    #[test]
    fn test_first_failure_wins() {
        let tmp = TempDir::new().unwrap();
        let (root, modules) = two_module_build(tmp.path());
        let engine = Arc::new(
            FakeEngine::new(root, modules)
                .with_goal_failure("org.example:b", "compilation failure")
                .with_goal_failure("org.example:b", "tests failed"),
        );
        let build = discover(Arc::clone(&engine), tmp.path());

        let err = execute_module_build(&build, &module_b(&build), &BTreeMap::new()).unwrap_err();
        match err {
            ExecutionError::BuildFailure {
                ref module,
                ref cause,
                ref suppressed,
            } => {
                assert_eq!(module, "org.example:b");
                assert!(matches!(cause, EngineError::GoalFailed { message, .. } if message == "compilation failure"));
                assert_eq!(suppressed.len(), 1);
            }
        }
        assert_eq!(engine.session_scope().active(), 0);
    }

    #[test]
    fn test_info_report() {
        let module = jar_module(std::path::Path::new("/w"), "a");
        let report = info_report(&module);
        let mut lines = report.lines();
        let title = lines.next().unwrap();
        assert_eq!(title, "Maven POM of org.example:a:1.0 from /w/a/pom.xml");
        assert_eq!(lines.next().unwrap(), "-".repeat(title.len()));
        assert_eq!(lines.next().unwrap(), "");
        assert!(report.contains("Artifact ID: a\n"));
        assert!(report.contains("Jar file:    /w/a/target/a-1.0.jar\n"));
    }

    #[test]
    fn test_pom_dump_reads_descriptor() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("a")).unwrap();
        std::fs::write(tmp.path().join("a").join("pom.xml"), "<project/>\n").unwrap();
        let module = jar_module(tmp.path(), "a");
        assert!(pom_dump(&module).unwrap().ends_with("\n\n<project/>\n"));
    }

    #[test]
    fn test_build_task_registration() {
        let tmp = TempDir::new().unwrap();
        let (root, modules) = two_module_build(tmp.path());
        let build = discover(Arc::new(FakeEngine::new(root, modules)), tmp.path());
        let module = module_b(&build);

        let mut project = Project::new(ProjectPath::parse(":mvn:b").unwrap(), tmp.path(), "b");
        apply_java_base(&mut project).unwrap();
        let path = register_build_task(&mut project, &build, &module).unwrap();
        declare_build_files(&mut project, &module).unwrap();

        assert_eq!(path.to_string(), ":mvn:b:mavenBuild");
        let task = project.task(MAVEN_BUILD_TASK).unwrap();
        assert_eq!(
            task.description.as_deref(),
            Some("Builds Maven project org.example:b using package")
        );
        assert_eq!(task.inputs[0], module.descriptor());
        assert_eq!(task.outputs, vec![module.jar_output_file()]);
        assert!(project
            .task(BUILD_TASK)
            .unwrap()
            .depends_on
            .contains(&TaskDependency::task(path)));
    }

    #[test]
    fn test_cross_project_wiring_skips_missing_buckets() {
        let mut project = Project::new(ProjectPath::parse(":mvn:p").unwrap(), "/w", "p");
        apply_java_base(&mut project).unwrap();
        project.register_task(Task::new(MAVEN_BUILD_TASK)).unwrap();
        project.add_configuration(crate::native::Configuration::consumable("apiElements"));
        wire_cross_project(&mut project).unwrap();

        let task = project.task(MAVEN_BUILD_TASK).unwrap();
        assert_eq!(
            task.depends_on,
            vec![TaskDependency::FromProjectDependencies {
                configuration: "apiElements".to_string(),
                use_depended_on: true,
                task: MAVEN_BUILD_TASK.to_string(),
            }]
        );
        assert_eq!(project.task(BUILD_NEEDED_TASK).unwrap().depends_on.len(), 1);
    }
}
