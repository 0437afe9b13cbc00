//! PomEngine - builds modules from `pom.xml` descriptors and executes goals
//! with the `mvn` executable.
//!
//! Model building happens in two steps. Every descriptor is first turned
//! into an effective model: the parent chain is resolved (by relative path,
//! then from the local repository), inherited sections are merged and
//! active profiles are applied. The effective model is then interpolated
//! and converted into an immutable [`ForeignModule`]. Plugin versions,
//! managed dependency versions and attached artifacts are all resolved at
//! that point.
//!
//! Goals run in one `mvn` process per module. Maven only resolves reactor
//! modules selected in the same invocation, so the artifacts of in-reactor
//! upstream modules are staged into a repository consulted before the
//! configured local repository.

use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::dependency::{DEFAULT_SCOPE, DEFAULT_TYPE};
use crate::core::{
    BuildLayout, Coordinate, Dependency, Exclusion, ForeignArtifact, ForeignModule, GroupArtifact,
    ModuleIndex, Plugin,
};
use crate::engine::interpolate::interpolate;
use crate::engine::pom::{
    self, RawBuild, RawDependency, RawParent, RawPlugin, RawPom, RawProfile, RawSection,
    DEFAULT_PLUGIN_GROUP,
};
use crate::engine::session::{RepositorySession, ScopedSession, Session, SessionScope};
use crate::engine::workspace::{ComponentRegistry, WorkspaceReader};
use crate::engine::{
    EngineError, EngineLogLevel, ExecutionRequest, ExecutionResult, ForeignEngine, GraphResult,
    ModelProblem, ProjectDependencyGraph,
};
use crate::util::fs::normalize_path;
use crate::util::process::{find_executable, ProcessBuilder};

/// Descriptor file name inside a module directory.
pub const POM_FILE: &str = "pom.xml";

/// Lines of build output kept in failure messages.
const OUTPUT_TAIL_LINES: usize = 30;

/// The descriptor-reading engine.
#[derive(Debug, Default)]
pub struct PomEngine {
    components: ComponentRegistry,
    scope: SessionScope,
    executable: Option<PathBuf>,
}

impl PomEngine {
    pub fn new() -> Self {
        PomEngine::default()
    }

    /// Use `components` for scoped component lookups.
    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    /// Run goals with this executable instead of searching for one.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    /// The wrapper in the build's root wins over `mvn` from `PATH`.
    fn locate_executable(&self, base_directory: &Path) -> Result<PathBuf, EngineError> {
        if let Some(ref executable) = self.executable {
            return Ok(executable.clone());
        }

        let wrapper = if cfg!(windows) { "mvnw.cmd" } else { "mvnw" };
        let wrapper = base_directory.join(wrapper);
        if wrapper.is_file() {
            return Ok(wrapper);
        }

        find_executable("mvn").ok_or_else(|| EngineError::ExecutableNotFound("mvn".to_string()))
    }

    fn goal_command(
        &self,
        request: &ExecutionRequest,
        module: &ForeignModule,
        staging: Option<&Path>,
    ) -> Result<ProcessBuilder, EngineError> {
        let executable = self.locate_executable(&request.base_directory)?;
        let mut cmd = ProcessBuilder::new(executable)
            .arg("-B")
            .arg("-f")
            .arg(&request.pom)
            .arg("--projects")
            .arg(module.group_artifact().to_string());

        if request.recursive {
            cmd = cmd.arg("--also-make");
        }

        let profiles: Vec<String> = request
            .active_profiles
            .iter()
            .cloned()
            .chain(request.inactive_profiles.iter().map(|p| format!("!{}", p)))
            .collect();
        if !profiles.is_empty() {
            cmd = cmd.arg("-P").arg(profiles.join(","));
        }

        for (key, value) in request
            .system_properties
            .iter()
            .chain(request.user_properties.iter())
        {
            cmd = cmd.arg(format!("-D{}={}", key, value));
        }

        match staging {
            Some(staging) => {
                cmd = cmd
                    .arg(format!("-Dmaven.repo.local={}", staging.display()))
                    .arg(format!(
                        "-Dmaven.repo.local.tail={}",
                        request.local_repository.display()
                    ));
            }
            None => {
                cmd = cmd.arg(format!(
                    "-Dmaven.repo.local={}",
                    request.local_repository.display()
                ));
            }
        }
        if request.offline {
            cmd = cmd.arg("--offline");
        }
        match request.log_level {
            EngineLogLevel::Debug => cmd = cmd.arg("-X"),
            EngineLogLevel::Info | EngineLogLevel::Warn => {}
            EngineLogLevel::Error | EngineLogLevel::Fatal | EngineLogLevel::Disabled => {
                cmd = cmd.arg("-q")
            }
        }
        if request.show_errors {
            cmd = cmd.arg("-e");
        }

        Ok(cmd.args(&request.goals).cwd(&request.base_directory))
    }

    fn execute_module(&self, session: &Session, module: &ForeignModule) -> Result<(), EngineError> {
        let request = &session.request;
        let staging = stage_reactor(session, module)?;
        let cmd = self.goal_command(request, module, staging.as_deref())?;
        tracing::debug!("Running {}", cmd.display_command());

        let outcome = cmd
            .exec_tail(OUTPUT_TAIL_LINES)
            .map_err(|e| EngineError::Other(format!("{:#}", e)))?;
        if outcome.success() {
            return Ok(());
        }

        Err(EngineError::GoalFailed {
            module: module.coordinate().to_string(),
            goals: request.goals.clone(),
            message: format!("exit code {:?}\n{}", outcome.status.code(), outcome.tail),
        })
    }
}

impl ForeignEngine for PomEngine {
    fn new_repository_session(&self, request: &ExecutionRequest) -> RepositorySession {
        RepositorySession::new(request.local_repository.clone(), request.offline)
    }

    fn build_module(
        &self,
        pom: &Path,
        request: &ExecutionRequest,
        repository: &RepositorySession,
    ) -> Result<ForeignModule, EngineError> {
        let mut builder = ModelBuilder::new(request, repository);
        let effective = builder.effective(pom)?;
        builder.to_module(&effective)
    }

    fn build_reactor(
        &self,
        pom: &Path,
        recursive: bool,
        request: &ExecutionRequest,
        repository: &RepositorySession,
    ) -> Result<Vec<ForeignModule>, EngineError> {
        let mut builder = ModelBuilder::new(request, repository);
        let mut visited = HashSet::new();
        let mut effective = Vec::new();
        builder.collect(pom, recursive, &mut visited, &mut effective)?;

        effective
            .iter()
            .map(|e| builder.to_module(e))
            .collect()
    }

    fn build_dependency_graph(&self, session: &Session) -> GraphResult {
        build_graph(&session.projects)
    }

    fn execute_goals(&self, session: &ScopedSession<'_>) -> ExecutionResult {
        let mut result = ExecutionResult::default();
        for module in &session.projects {
            tracing::info!(
                "Executing {:?} for {}",
                session.request.goals,
                module.coordinate()
            );
            if let Err(e) = self.execute_module(session.session(), module) {
                result.exceptions.push(e);
            }
        }
        result
    }

    fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    fn session_scope(&self) -> &SessionScope {
        &self.scope
    }
}

/// Path of an artifact inside a local repository.
pub fn repository_path(
    local_repository: &Path,
    coordinate: &Coordinate,
    extension: &str,
) -> PathBuf {
    version_directory(local_repository, coordinate).join(format!(
        "{}-{}.{}",
        coordinate.artifact(),
        coordinate.version(),
        extension
    ))
}

/// Path of `artifact`, classifier included, inside a local repository.
pub fn artifact_repository_path(local_repository: &Path, artifact: &ForeignArtifact) -> PathBuf {
    version_directory(local_repository, artifact.coordinate()).join(artifact.file_name())
}

fn version_directory(local_repository: &Path, coordinate: &Coordinate) -> PathBuf {
    let mut path = local_repository.to_path_buf();
    for part in coordinate.group().split('.') {
        path.push(part);
    }
    path.push(coordinate.artifact());
    path.push(coordinate.version());
    path
}

/// Repository receiving the reactor artifacts staged for `module`, below the
/// root module's build directory.
pub fn staging_repository(session: &Session, module: &ForeignModule) -> PathBuf {
    let build_dir = session
        .current_project
        .as_ref()
        .map(|root| root.build().directory.clone())
        .unwrap_or_else(|| session.request.base_directory.join("target"));
    build_dir.join("include-maven").join(format!(
        "{}.{}",
        module.coordinate().group(),
        module.coordinate().artifact()
    ))
}

/// In-reactor modules `module` needs, transitively: parents, dependencies,
/// plugins and plugin dependencies with a matching version.
fn reactor_upstream(index: &ModuleIndex, module: &ForeignModule) -> Vec<Arc<ForeignModule>> {
    let direct = |m: &ForeignModule| -> Vec<Arc<ForeignModule>> {
        let mut refs: Vec<(GroupArtifact, Option<String>)> = m
            .parents()
            .iter()
            .map(|p| (p.group_artifact(), Some(p.version().to_string())))
            .collect();
        for dep in m.dependencies() {
            refs.push((dep.group_artifact(), dep.version().map(str::to_string)));
        }
        for plugin in m.plugins() {
            refs.push((plugin.group_artifact(), plugin.version().map(str::to_string)));
            for dep in plugin.dependencies() {
                refs.push((dep.group_artifact(), dep.version().map(str::to_string)));
            }
        }
        refs.iter()
            .filter_map(|(ga, version)| index.get_version(ga, version.as_deref()).cloned())
            .collect()
    };

    let mut seen: HashSet<Coordinate> = HashSet::new();
    seen.insert(module.coordinate().clone());
    let mut upstream = Vec::new();
    let mut pending = direct(module);
    while let Some(next) = pending.pop() {
        if !seen.insert(next.coordinate().clone()) {
            continue;
        }
        pending.extend(direct(next.as_ref()));
        upstream.push(next);
    }
    upstream
}

/// Copy every packaged artifact and descriptor of the in-reactor upstream
/// modules of `module`, as found by the session's workspace reader, into the
/// module's staging repository.
///
/// Returns `None` when there is nothing to stage. Unpackaged artifacts are
/// skipped; the execution then falls back to the configured local
/// repository for them.
fn stage_reactor(session: &Session, module: &ForeignModule) -> Result<Option<PathBuf>, EngineError> {
    let reader: &dyn WorkspaceReader = match session.repository.workspace_reader {
        Some(ref reader) => reader.as_ref(),
        None => return Ok(None),
    };
    let upstream = reactor_upstream(&session.project_index, module);
    if upstream.is_empty() {
        return Ok(None);
    }

    let staging = staging_repository(session, module);
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| EngineError::Io { path, source }
    };
    if staging.exists() {
        std::fs::remove_dir_all(&staging).map_err(io(&staging))?;
    }

    for upstream in &upstream {
        let descriptor = ForeignArtifact::new(upstream.coordinate().clone(), "pom");
        let artifacts = std::iter::once(&descriptor)
            .chain(upstream.all_artifacts().filter(|a| a.extension() != "pom"));
        for artifact in artifacts {
            let Some(file) = reader.find_artifact(artifact).filter(|f| f.is_file()) else {
                tracing::debug!(
                    "{} of {} is not packaged, not staging it",
                    artifact.type_and_classifier(),
                    artifact.coordinate()
                );
                continue;
            };
            let target = artifact_repository_path(&staging, artifact);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(io(parent))?;
            }
            std::fs::copy(&file, &target).map_err(io(&file))?;
            tracing::debug!("Staged {} as {}", file.display(), target.display());
        }
    }
    Ok(Some(staging))
}

/// A descriptor with its parents merged in.
#[derive(Debug, Clone)]
struct EffectivePom {
    descriptor: PathBuf,
    base_dir: PathBuf,
    coordinate: Coordinate,
    packaging: String,
    name: Option<String>,
    /// Nearest first
    parents: Vec<Coordinate>,
    /// Modules declared by this descriptor and its active profiles
    modules: Vec<String>,
    section: RawSection,
    build: RawBuild,
}

struct ModelBuilder<'a> {
    request: &'a ExecutionRequest,
    repository: &'a RepositorySession,
    cache: HashMap<PathBuf, Arc<EffectivePom>>,
    in_progress: Vec<PathBuf>,
}

impl<'a> ModelBuilder<'a> {
    fn new(request: &'a ExecutionRequest, repository: &'a RepositorySession) -> Self {
        ModelBuilder {
            request,
            repository,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Collect `pom` and, if `recursive`, its modules depth-first in
    /// declaration order.
    fn collect(
        &mut self,
        pom: &Path,
        recursive: bool,
        visited: &mut HashSet<PathBuf>,
        out: &mut Vec<Arc<EffectivePom>>,
    ) -> Result<(), EngineError> {
        let pom = normalize_path(pom);
        if !visited.insert(pom.clone()) {
            return Ok(());
        }

        let effective = self.effective(&pom)?;
        out.push(Arc::clone(&effective));

        if !recursive {
            return Ok(());
        }

        for module in &effective.modules {
            let mut path = effective.base_dir.join(module);
            if path.is_dir() {
                path = path.join(POM_FILE);
            }
            if !path.is_file() {
                return Err(EngineError::MissingModule {
                    module: path,
                    parent: effective.descriptor.clone(),
                });
            }
            self.collect(&path, true, visited, out)?;
        }
        Ok(())
    }

    fn effective(&mut self, pom: &Path) -> Result<Arc<EffectivePom>, EngineError> {
        let key = normalize_path(pom);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Arc::clone(hit));
        }
        if self.in_progress.contains(&key) {
            return Err(EngineError::Parse {
                path: key,
                message: "the parent chain contains a cycle".to_string(),
            });
        }

        self.in_progress.push(key.clone());
        let result = self.compute(&key);
        self.in_progress.pop();

        let effective = Arc::new(result?);
        self.cache.insert(key, Arc::clone(&effective));
        Ok(effective)
    }

    fn compute(&mut self, pom: &Path) -> Result<EffectivePom, EngineError> {
        let raw = pom::read(pom)?;
        let base_dir = pom.parent().map(Path::to_path_buf).unwrap_or_default();

        let parent = match raw.parent {
            Some(ref declared) => Some(self.resolve_parent(pom, &base_dir, declared)?),
            None => None,
        };

        let mut section = parent
            .as_ref()
            .map(|p| p.section.clone())
            .unwrap_or_default();
        let mut modules = raw.section.modules.clone();
        merge_section(&mut section, &raw.section);
        for profile in self.active_profiles(&raw) {
            tracing::debug!(
                "Activating profile '{}' in {}",
                profile.id.as_deref().unwrap_or_default(),
                pom.display()
            );
            merge_section(&mut section, &profile.section);
            modules.extend(profile.section.modules.iter().cloned());
        }

        let mut build = parent.as_ref().map(|p| p.build.clone()).unwrap_or_default();
        merge_build(&mut build, &raw.build);

        let missing = |field| EngineError::MissingField {
            field,
            path: pom.to_path_buf(),
        };
        let group = raw
            .group
            .clone()
            .or_else(|| raw.parent.as_ref().and_then(|p| p.group.clone()))
            .ok_or_else(|| missing("groupId"))?;
        let artifact = raw.artifact.clone().ok_or_else(|| missing("artifactId"))?;
        let version = raw
            .version
            .clone()
            .or_else(|| raw.parent.as_ref().and_then(|p| p.version.clone()))
            .ok_or_else(|| missing("version"))?;

        let lookup = |key: &str| {
            self.request
                .user_properties
                .get(key)
                .or_else(|| section.properties.get(key))
                .or_else(|| self.request.system_properties.get(key))
                .cloned()
        };
        let coordinate = Coordinate::new(
            interpolate(&group, lookup),
            interpolate(&artifact, lookup),
            interpolate(&version, lookup),
        );

        let parents = parent
            .map(|p| {
                std::iter::once(p.coordinate.clone())
                    .chain(p.parents.iter().cloned())
                    .collect()
            })
            .unwrap_or_default();

        section.modules.clear();

        Ok(EffectivePom {
            descriptor: pom.to_path_buf(),
            base_dir,
            coordinate,
            packaging: raw.packaging.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            name: raw.name.clone(),
            parents,
            modules,
            section,
            build,
        })
    }

    fn resolve_parent(
        &mut self,
        child: &Path,
        base_dir: &Path,
        declared: &RawParent,
    ) -> Result<Arc<EffectivePom>, EngineError> {
        let missing = |field| EngineError::MissingField {
            field,
            path: child.to_path_buf(),
        };
        let group = declared.group.as_deref().ok_or_else(|| missing("parent.groupId"))?;
        let artifact = declared
            .artifact
            .as_deref()
            .ok_or_else(|| missing("parent.artifactId"))?;
        let version = declared
            .version
            .as_deref()
            .ok_or_else(|| missing("parent.version"))?;
        let wanted = Coordinate::new(group, artifact, version);

        if declared.relative_path.as_deref() != Some("") {
            let relative = declared.relative_path.as_deref().unwrap_or("../pom.xml");
            let mut candidate = base_dir.join(relative);
            if candidate.is_dir() {
                candidate = candidate.join(POM_FILE);
            }
            if candidate.is_file() {
                let effective = self.effective(&candidate)?;
                if effective.coordinate == wanted {
                    return Ok(effective);
                }
                tracing::debug!(
                    "{} is {}, not the declared parent {}",
                    candidate.display(),
                    effective.coordinate,
                    wanted
                );
            }
        }

        let installed = repository_path(&self.repository.local_repository, &wanted, "pom");
        if installed.is_file() {
            return self.effective(&installed);
        }

        Err(EngineError::MissingParent {
            parent: wanted.to_string(),
            child: child.to_path_buf(),
        })
    }

    /// Explicitly activated profiles, or the default ones if none is.
    fn active_profiles<'p>(&self, raw: &'p RawPom) -> Vec<&'p RawProfile> {
        let deactivated = |p: &RawProfile| {
            p.id
                .as_ref()
                .is_some_and(|id| self.request.inactive_profiles.contains(id))
        };
        let explicit: Vec<_> = raw
            .profiles
            .iter()
            .filter(|p| {
                p.id
                    .as_ref()
                    .is_some_and(|id| self.request.active_profiles.contains(id))
                    && !deactivated(p)
            })
            .collect();
        if !explicit.is_empty() {
            return explicit;
        }
        raw.profiles
            .iter()
            .filter(|p| p.active_by_default && !deactivated(p))
            .collect()
    }

    /// Interpolate and freeze an effective model.
    fn to_module(&self, effective: &EffectivePom) -> Result<ForeignModule, EngineError> {
        let coordinate = &effective.coordinate;
        let mut builtins: BTreeMap<&str, String> = BTreeMap::new();
        for key in ["project.groupId", "pom.groupId", "groupId"] {
            builtins.insert(key, coordinate.group().to_string());
        }
        for key in ["project.artifactId", "pom.artifactId", "artifactId"] {
            builtins.insert(key, coordinate.artifact().to_string());
        }
        for key in ["project.version", "pom.version", "version"] {
            builtins.insert(key, coordinate.version().to_string());
        }
        for key in ["project.basedir", "basedir"] {
            builtins.insert(key, effective.base_dir.display().to_string());
        }
        builtins.insert("project.packaging", effective.packaging.clone());
        if let Some(ref name) = effective.name {
            builtins.insert("project.name", name.clone());
        }
        if let Some(parent) = effective.parents.first() {
            builtins.insert("project.parent.groupId", parent.group().to_string());
            builtins.insert("project.parent.artifactId", parent.artifact().to_string());
            builtins.insert("project.parent.version", parent.version().to_string());
        }

        let directory = {
            let value = |key: &str| self.property(effective, &builtins, key);
            let raw = effective.build.directory.as_deref().unwrap_or("target");
            effective.base_dir.join(interpolate(raw, value))
        };
        builtins.insert("project.build.directory", directory.display().to_string());
        let final_name = {
            let value = |key: &str| self.property(effective, &builtins, key);
            let raw = effective
                .build
                .final_name
                .as_deref()
                .unwrap_or("${project.artifactId}-${project.version}");
            interpolate(raw, value)
        };
        builtins.insert("project.build.finalName", final_name.clone());

        let value = |key: &str| self.property(effective, &builtins, key);
        let resolve = |s: &str| interpolate(s, value);
        let source_root = |raw: Option<&str>, default: &str| {
            effective
                .base_dir
                .join(resolve(raw.unwrap_or(default)))
        };

        let build = BuildLayout {
            directory,
            final_name,
            source_roots: vec![source_root(
                effective.build.source_directory.as_deref(),
                "src/main/java",
            )],
            test_source_roots: vec![source_root(
                effective.build.test_source_directory.as_deref(),
                "src/test/java",
            )],
        };

        let managed: Vec<RawDependency> = effective
            .section
            .dependency_management
            .iter()
            .map(|d| interpolate_dependency(d, &resolve))
            .collect();

        let dependency_management = managed
            .iter()
            .map(|d| self.dependency(d.clone(), effective))
            .collect::<Result<Vec<_>, _>>()?;

        let dependencies = effective
            .section
            .dependencies
            .iter()
            .map(|d| {
                let dep = apply_management(interpolate_dependency(d, &resolve), &managed);
                self.dependency(dep, effective)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut module = ForeignModule::new(
            coordinate.clone(),
            effective.packaging.clone(),
            effective.descriptor.clone(),
        )
        .with_name(effective.name.as_ref().map(|n| resolve(n)))
        .with_parents(effective.parents.clone())
        .with_dependencies(dependencies)
        .with_dependency_management(dependency_management)
        .with_build(build);

        for raw in &effective.section.plugins {
            let plugin = self.plugin(raw, &effective.section.plugin_management, &resolve, effective)?;
            if !module.is_aggregator() {
                for artifact in attached_artifacts(&plugin, coordinate) {
                    module = module.with_attached_artifact(artifact);
                }
            }
            module = module.with_plugin(plugin);
        }

        Ok(module.with_extension_realm(extension_realm(effective, &resolve)))
    }

    /// User properties win over model properties, which win over system
    /// properties.
    fn property(
        &self,
        effective: &EffectivePom,
        builtins: &BTreeMap<&str, String>,
        key: &str,
    ) -> Option<String> {
        self.request
            .user_properties
            .get(key)
            .or_else(|| builtins.get(key))
            .or_else(|| effective.section.properties.get(key))
            .or_else(|| self.request.system_properties.get(key))
            .cloned()
            .or_else(|| key.strip_prefix("env.").and_then(|name| std::env::var(name).ok()))
    }

    fn dependency(
        &self,
        raw: RawDependency,
        effective: &EffectivePom,
    ) -> Result<Dependency, EngineError> {
        let missing = |field| EngineError::MissingField {
            field,
            path: effective.descriptor.clone(),
        };
        let group = raw.group.ok_or_else(|| missing("dependency.groupId"))?;
        let artifact = raw.artifact.ok_or_else(|| missing("dependency.artifactId"))?;

        let mut dep = Dependency::new(group, artifact, raw.version)
            .with_type(raw.type_.unwrap_or_else(|| DEFAULT_TYPE.to_string()))
            .with_classifier(raw.classifier)
            .with_scope(raw.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string()))
            .optional(raw.optional.as_deref() == Some("true"));
        for (group, artifact) in raw.exclusions {
            dep = dep.with_exclusion(Exclusion::new(group, artifact));
        }
        Ok(dep)
    }

    fn plugin<F>(
        &self,
        raw: &RawPlugin,
        management: &[RawPlugin],
        resolve: &F,
        effective: &EffectivePom,
    ) -> Result<Plugin, EngineError>
    where
        F: Fn(&str) -> String,
    {
        let group = raw.group.as_deref().unwrap_or(DEFAULT_PLUGIN_GROUP);
        let artifact = raw.artifact.as_deref().ok_or_else(|| EngineError::MissingField {
            field: "plugin.artifactId",
            path: effective.descriptor.clone(),
        })?;

        let version = raw.version.clone().or_else(|| {
            management
                .iter()
                .find(|m| {
                    m.group.as_deref().unwrap_or(DEFAULT_PLUGIN_GROUP) == group
                        && m.artifact.as_deref() == Some(artifact)
                })
                .and_then(|m| m.version.clone())
        });

        let mut plugin = Plugin::new(resolve(group), resolve(artifact), version.map(|v| resolve(&v)));
        for goal in &raw.goals {
            plugin = plugin.with_goal(goal.clone());
        }
        for dep in &raw.dependencies {
            plugin = plugin.with_dependency(self.dependency(interpolate_dependency(dep, resolve), effective)?);
        }
        Ok(plugin)
    }
}

fn interpolate_dependency<F>(raw: &RawDependency, resolve: &F) -> RawDependency
where
    F: Fn(&str) -> String,
{
    let opt = |v: &Option<String>| v.as_deref().map(resolve);
    RawDependency {
        group: opt(&raw.group),
        artifact: opt(&raw.artifact),
        version: opt(&raw.version),
        type_: opt(&raw.type_),
        classifier: opt(&raw.classifier),
        scope: opt(&raw.scope),
        optional: opt(&raw.optional),
        exclusions: raw
            .exclusions
            .iter()
            .map(|(g, a)| (resolve(g), resolve(a)))
            .collect(),
    }
}

fn dependency_key(dep: &RawDependency) -> (Option<&str>, Option<&str>, &str, Option<&str>) {
    (
        dep.group.as_deref(),
        dep.artifact.as_deref(),
        dep.type_.as_deref().unwrap_or(DEFAULT_TYPE),
        dep.classifier.as_deref(),
    )
}

/// Fill version, scope and exclusions from the matching managed entry.
fn apply_management(mut dep: RawDependency, managed: &[RawDependency]) -> RawDependency {
    let Some(entry) = managed
        .iter()
        .find(|m| dependency_key(m) == dependency_key(&dep))
    else {
        return dep;
    };

    if dep.version.is_none() {
        dep.version = entry.version.clone();
    }
    if dep.scope.is_none() {
        dep.scope = entry.scope.clone();
    }
    if dep.optional.is_none() {
        dep.optional = entry.optional.clone();
    }
    if dep.exclusions.is_empty() {
        dep.exclusions = entry.exclusions.clone();
    }
    dep
}

fn merge_dependencies(target: &mut Vec<RawDependency>, source: &[RawDependency]) {
    for dep in source {
        match target
            .iter_mut()
            .find(|d| dependency_key(d) == dependency_key(dep))
        {
            Some(existing) => *existing = dep.clone(),
            None => target.push(dep.clone()),
        }
    }
}

fn merge_plugins(target: &mut Vec<RawPlugin>, source: &[RawPlugin]) {
    for plugin in source {
        let key = (
            plugin.group.as_deref().unwrap_or(DEFAULT_PLUGIN_GROUP),
            plugin.artifact.as_deref(),
        );
        let existing = target.iter_mut().find(|p| {
            (p.group.as_deref().unwrap_or(DEFAULT_PLUGIN_GROUP), p.artifact.as_deref()) == key
        });
        match existing {
            Some(existing) => {
                if plugin.version.is_some() {
                    existing.version = plugin.version.clone();
                }
                existing.extensions |= plugin.extensions;
                for goal in &plugin.goals {
                    if !existing.goals.contains(goal) {
                        existing.goals.push(goal.clone());
                    }
                }
                merge_dependencies(&mut existing.dependencies, &plugin.dependencies);
            }
            None => target.push(plugin.clone()),
        }
    }
}

/// Merge `source` over `target`. Modules are not inherited.
fn merge_section(target: &mut RawSection, source: &RawSection) {
    target
        .properties
        .extend(source.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
    merge_dependencies(&mut target.dependencies, &source.dependencies);
    merge_dependencies(&mut target.dependency_management, &source.dependency_management);
    merge_plugins(&mut target.plugins, &source.plugins);
    merge_plugins(&mut target.plugin_management, &source.plugin_management);
}

fn merge_build(target: &mut RawBuild, source: &RawBuild) {
    if source.directory.is_some() {
        target.directory = source.directory.clone();
    }
    if source.final_name.is_some() {
        target.final_name = source.final_name.clone();
    }
    if source.source_directory.is_some() {
        target.source_directory = source.source_directory.clone();
    }
    if source.test_source_directory.is_some() {
        target.test_source_directory = source.test_source_directory.clone();
    }
    target.extensions.extend(source.extensions.iter().cloned());
}

/// Artifacts that well-known packaging plugins attach to a module.
fn attached_artifacts(plugin: &Plugin, coordinate: &Coordinate) -> Vec<ForeignArtifact> {
    if plugin.group() != DEFAULT_PLUGIN_GROUP {
        return Vec::new();
    }

    let mut attached = Vec::new();
    for goal in plugin.goals() {
        let artifact = match (plugin.artifact(), goal.as_str()) {
            ("maven-jar-plugin", "test-jar") => ForeignArtifact::new(coordinate.clone(), "test-jar"),
            ("maven-source-plugin", "jar" | "jar-no-fork") => {
                ForeignArtifact::new(coordinate.clone(), "java-source")
            }
            ("maven-source-plugin", "test-jar" | "test-jar-no-fork") => {
                ForeignArtifact::new(coordinate.clone(), "java-source").with_classifier("test-sources")
            }
            ("maven-javadoc-plugin", "jar") => ForeignArtifact::new(coordinate.clone(), "javadoc"),
            _ => continue,
        };
        if !attached.contains(&artifact) {
            attached.push(artifact);
        }
    }
    attached
}

/// Name of the realm holding the module's build extensions, if it has any.
fn extension_realm<F>(effective: &EffectivePom, resolve: &F) -> Option<String>
where
    F: Fn(&str) -> String,
{
    let mut extensions: BTreeSet<String> = effective
        .build
        .extensions
        .iter()
        .filter_map(|e| {
            Some(format!(
                "{}:{}:{}",
                resolve(e.group.as_deref()?),
                resolve(e.artifact.as_deref()?),
                resolve(e.version.as_deref().unwrap_or_default())
            ))
        })
        .collect();
    for plugin in effective.section.plugins.iter().filter(|p| p.extensions) {
        if let Some(ref artifact) = plugin.artifact {
            extensions.insert(format!(
                "{}:{}:{}",
                plugin.group.as_deref().unwrap_or(DEFAULT_PLUGIN_GROUP),
                artifact,
                resolve(plugin.version.as_deref().unwrap_or_default())
            ));
        }
    }

    match extensions.len() {
        0 => None,
        1 => extensions.into_iter().next().map(|e| format!("extension>{}", e)),
        _ => Some(format!("project>{}", effective.coordinate)),
    }
}

/// Order `projects` so that upstream modules come first.
///
/// Edges are dependencies, parents and plugins (including plugin
/// dependencies) that point at another reactor module with the same
/// version. Among independent modules the declaration order is kept.
pub(crate) fn build_graph(projects: &[Arc<ForeignModule>]) -> GraphResult {
    let mut result = GraphResult::default();
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..projects.len()).map(|i| graph.add_node(i)).collect();

    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut by_ga: HashMap<String, usize> = HashMap::new();
    for (i, module) in projects.iter().enumerate() {
        by_key.insert(module.coordinate().key(), i);
        by_ga.entry(module.group_artifact().to_string()).or_insert(i);
    }

    let mut upstream: BTreeMap<Coordinate, Vec<Coordinate>> = BTreeMap::new();
    for (i, module) in projects.iter().enumerate() {
        let mut targets: Vec<(String, Option<String>)> = Vec::new();
        for parent in module.parents().iter().take(1) {
            targets.push((parent.group_artifact().to_string(), Some(parent.version().to_string())));
        }
        for dep in module.dependencies() {
            targets.push((dep.group_artifact().to_string(), dep.version().map(str::to_string)));
        }
        for plugin in module.plugins() {
            targets.push((plugin.group_artifact().to_string(), plugin.version().map(str::to_string)));
            for dep in plugin.dependencies() {
                targets.push((dep.group_artifact().to_string(), dep.version().map(str::to_string)));
            }
        }

        for (ga, version) in targets {
            let Some(&j) = by_ga.get(&ga) else { continue };
            let target = &projects[j];
            let exact = version
                .as_deref()
                .and_then(|v| by_key.get(&format!("{}:{}", ga, v)).copied());
            let Some(j) = exact else {
                result.problems.push(ModelProblem::warning(format!(
                    "{} refers to {} in version {} but the reactor contains version {}",
                    module.coordinate(),
                    ga,
                    version.as_deref().unwrap_or("<none>"),
                    target.coordinate().version()
                )));
                continue;
            };
            if i == j || graph.contains_edge(nodes[j], nodes[i]) {
                continue;
            }
            graph.add_edge(nodes[j], nodes[i], ());
            upstream
                .entry(module.coordinate().clone())
                .or_default()
                .push(projects[j].coordinate().clone());
        }
    }

    for component in kosaraju_scc(&graph) {
        if component.len() > 1 {
            let mut members: Vec<String> = component
                .iter()
                .map(|&n| projects[graph[n]].coordinate().to_string())
                .collect();
            members.sort();
            result.problems.push(ModelProblem::error(format!(
                "The projects in the reactor contain a cyclic reference: {}",
                members.join(" -> ")
            )));
        }
    }
    if result.has_errors() {
        return result;
    }

    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();
    let mut sorted = Vec::with_capacity(projects.len());
    while let Some(Reverse(i)) = ready.pop() {
        sorted.push(Arc::clone(&projects[i]));
        for next in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
            let j = graph[next];
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                ready.push(Reverse(j));
            }
        }
    }

    result.graph = Some(ProjectDependencyGraph::new(sorted, upstream));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReactorReader;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn request(tmp: &TempDir) -> ExecutionRequest {
        ExecutionRequest {
            pom: tmp.path().join(POM_FILE),
            base_directory: tmp.path().to_path_buf(),
            local_repository: tmp.path().join("repo"),
            ..Default::default()
        }
    }

    fn reactor(tmp: &TempDir) -> Vec<ForeignModule> {
        let request = request(tmp);
        let engine = PomEngine::new();
        let repo = engine.new_repository_session(&request);
        engine
            .build_reactor(&request.pom, true, &request, &repo)
            .unwrap()
    }

    const ROOT: &str = r#"<project>
  <groupId>org.example</groupId>
  <artifactId>root</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <properties><slf4j.version>2.0.9</slf4j.version></properties>
  <modules>
    <module>app</module>
    <module>lib</module>
  </modules>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.slf4j</groupId>
        <artifactId>slf4j-api</artifactId>
        <version>${slf4j.version}</version>
        <scope>runtime</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#;

    const LIB: &str = r#"<project>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>root</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>lib</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
    </dependency>
  </dependencies>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-jar-plugin</artifactId>
        <executions><execution><goals><goal>test-jar</goal></goals></execution></executions>
      </plugin>
    </plugins>
  </build>
</project>"#;

    const APP: &str = r#"<project>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>root</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>app</artifactId>
  <dependencies>
    <dependency>
      <groupId>${project.groupId}</groupId>
      <artifactId>lib</artifactId>
      <version>${project.version}</version>
    </dependency>
  </dependencies>
</project>"#;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pom.xml", ROOT);
        write(tmp.path(), "lib/pom.xml", LIB);
        write(tmp.path(), "app/pom.xml", APP);
        tmp
    }

    #[test]
    fn test_reactor_in_declaration_order() {
        let tmp = fixture();
        let modules = reactor(&tmp);
        let names: Vec<_> = modules.iter().map(|m| m.coordinate().artifact()).collect();
        assert_eq!(names, vec!["root", "app", "lib"]);
    }

    #[test]
    fn test_inheritance_and_management() {
        let tmp = fixture();
        let modules = reactor(&tmp);
        let lib = &modules[2];

        assert_eq!(lib.coordinate(), &Coordinate::new("org.example", "lib", "1.0"));
        assert_eq!(lib.parents(), &[Coordinate::new("org.example", "root", "1.0")]);
        let dep = &lib.dependencies()[0];
        assert_eq!(dep.version(), Some("2.0.9"));
        assert_eq!(dep.declared_scope(), "runtime");
        assert_eq!(lib.build().directory, tmp.path().join("lib").join("target"));
        assert_eq!(lib.build().final_name, "lib-1.0");
    }

    #[test]
    fn test_jar_plugin_attaches_test_jar() {
        let tmp = fixture();
        let modules = reactor(&tmp);
        let lib = &modules[2];
        let plugin = &lib.plugins()[0];
        assert_eq!(plugin.group(), DEFAULT_PLUGIN_GROUP);

        let attached = lib.attached_artifacts();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].type_(), "test-jar");
        assert_eq!(attached[0].classifier(), Some("tests"));
    }

    #[test]
    fn test_project_expressions_in_dependencies() {
        let tmp = fixture();
        let modules = reactor(&tmp);
        let app = &modules[1];
        let dep = &app.dependencies()[0];
        assert_eq!(dep.group(), "org.example");
        assert_eq!(dep.version(), Some("1.0"));
    }

    #[test]
    fn test_graph_puts_upstream_first() {
        let tmp = fixture();
        let modules: Vec<_> = reactor(&tmp).into_iter().map(Arc::new).collect();
        let result = build_graph(&modules);
        assert!(!result.has_errors());

        let graph = result.graph.unwrap();
        let order: Vec<_> = graph
            .sorted_projects()
            .iter()
            .map(|m| m.coordinate().artifact().to_string())
            .collect();
        assert_eq!(order, vec!["root", "lib", "app"]);
        assert_eq!(
            graph.upstream_projects(&Coordinate::new("org.example", "app", "1.0")),
            &[
                Coordinate::new("org.example", "root", "1.0"),
                Coordinate::new("org.example", "lib", "1.0")
            ]
        );
    }

    #[test]
    fn test_graph_reports_cycles() {
        let a = ForeignModule::new(Coordinate::new("g", "a", "1"), "jar", PathBuf::from("/a/pom.xml"))
            .with_dependency(Dependency::new("g", "b", Some("1".into())));
        let b = ForeignModule::new(Coordinate::new("g", "b", "1"), "jar", PathBuf::from("/b/pom.xml"))
            .with_dependency(Dependency::new("g", "a", Some("1".into())));

        let result = build_graph(&[Arc::new(a), Arc::new(b)]);
        assert!(result.has_errors());
        assert!(result.graph.is_none());
        assert!(result.problems[0].message.contains("cyclic reference"));
    }

    #[test]
    fn test_version_mismatch_is_a_warning() {
        let a = ForeignModule::new(Coordinate::new("g", "a", "1"), "jar", PathBuf::from("/a/pom.xml"));
        let b = ForeignModule::new(Coordinate::new("g", "b", "1"), "jar", PathBuf::from("/b/pom.xml"))
            .with_dependency(Dependency::new("g", "a", Some("0.9".into())));

        let result = build_graph(&[Arc::new(a), Arc::new(b)]);
        assert!(!result.has_errors());
        assert_eq!(result.problems.len(), 1);
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "pom.xml",
            r#"<project>
  <parent><groupId>org.example</groupId><artifactId>nowhere</artifactId><version>1</version></parent>
  <artifactId>orphan</artifactId>
</project>"#,
        );
        let request = request(&tmp);
        let engine = PomEngine::new();
        let repo = engine.new_repository_session(&request);
        let err = engine.build_module(&request.pom, &request, &repo).unwrap_err();
        assert!(matches!(err, EngineError::MissingParent { .. }));
    }

    #[test]
    fn test_parent_from_local_repository() {
        let tmp = TempDir::new().unwrap();
        let request = request(&tmp);
        let parent = Coordinate::new("org.example", "corp-parent", "7");
        let installed = repository_path(&request.local_repository, &parent, "pom");
        std::fs::create_dir_all(installed.parent().unwrap()).unwrap();
        std::fs::write(
            &installed,
            r#"<project><groupId>org.example</groupId><artifactId>corp-parent</artifactId>
<version>7</version><packaging>pom</packaging></project>"#,
        )
        .unwrap();
        write(
            tmp.path(),
            "pom.xml",
            r#"<project>
  <parent><groupId>org.example</groupId><artifactId>corp-parent</artifactId><version>7</version><relativePath/></parent>
  <artifactId>child</artifactId>
</project>"#,
        );

        let engine = PomEngine::new();
        let repo = engine.new_repository_session(&request);
        let module = engine.build_module(&request.pom, &request, &repo).unwrap();
        assert_eq!(module.coordinate().version(), "7");
        assert_eq!(module.parents(), &[parent]);
    }

    #[test]
    fn test_missing_module_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "pom.xml",
            r#"<project><groupId>g</groupId><artifactId>r</artifactId><version>1</version>
<packaging>pom</packaging><modules><module>gone</module></modules></project>"#,
        );
        let request = request(&tmp);
        let engine = PomEngine::new();
        let repo = engine.new_repository_session(&request);
        let err = engine
            .build_reactor(&request.pom, true, &request, &repo)
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingModule { .. }));
    }

    #[test]
    fn test_goal_command() {
        let tmp = fixture();
        let mut request = request(&tmp);
        request.goals = vec!["package".to_string()];
        request.offline = true;
        request.active_profiles = vec!["ci".to_string()];
        request.user_properties.insert("skipTests".into(), "true".into());

        let engine = PomEngine::new().with_executable("/usr/bin/mvn");
        let module = ForeignModule::new(
            Coordinate::new("org.example", "lib", "1.0"),
            "jar",
            tmp.path().join("lib").join(POM_FILE),
        );
        let command = engine
            .goal_command(&request, &module, None)
            .unwrap()
            .display_command();

        assert!(command.starts_with("/usr/bin/mvn -B -f "));
        assert!(command.contains("--projects org.example:lib"));
        assert!(command.contains("-P ci"));
        assert!(command.contains("-DskipTests=true"));
        assert!(command.contains("--offline"));
        assert!(command.ends_with("package"));
        assert!(!command.contains("--also-make"));
    }

    /// An `mvn` stand-in recording its arguments next to itself.
    #[cfg(unix)]
    fn recording_mvn(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let script = write(
            dir,
            "bin/mvn",
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\n",
        );
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_execution_sees_reactor_artifacts() {
        let tmp = fixture();
        write(tmp.path(), "lib/target/lib-1.0.jar", "lib classes");
        let mvn = recording_mvn(tmp.path());

        let mut request = request(&tmp);
        request.goals = vec!["package".to_string()];
        let engine = PomEngine::new().with_executable(&mvn);
        let modules: Vec<Arc<ForeignModule>> = reactor(&tmp).into_iter().map(Arc::new).collect();
        let index = Arc::new(ModuleIndex::build(modules.iter().cloned()).unwrap());
        let reader: Arc<dyn WorkspaceReader> = Arc::new(ReactorReader::new(Arc::clone(&index)));
        let repository = engine
            .new_repository_session(&request)
            .with_workspace_reader(reader);

        let app = Arc::clone(&modules[1]);
        let mut session = Session::new(request.clone(), repository);
        session.current_project = Some(Arc::clone(&modules[0]));
        session.project_index = index;
        session.projects = vec![Arc::clone(&app)];
        let staging = staging_repository(&session, &app);

        let result = {
            let scoped = engine.session_scope().enter(session);
            engine.execute_goals(&scoped)
        };
        assert!(result.exceptions.is_empty(), "{:?}", result.exceptions);

        let lib = Coordinate::new("org.example", "lib", "1.0");
        let root = Coordinate::new("org.example", "root", "1.0");
        assert_eq!(
            std::fs::read_to_string(repository_path(&staging, &lib, "jar")).unwrap(),
            "lib classes"
        );
        assert!(repository_path(&staging, &lib, "pom").is_file());
        assert!(repository_path(&staging, &root, "pom").is_file());
        assert!(staging.starts_with(tmp.path().join("target")));

        let args = std::fs::read_to_string(tmp.path().join("bin").join("args.txt")).unwrap();
        let args: Vec<&str> = args.lines().collect();
        let head = format!("-Dmaven.repo.local={}", staging.display());
        let tail = format!(
            "-Dmaven.repo.local.tail={}",
            request.local_repository.display()
        );
        assert!(args.contains(&head.as_str()), "{:?}", args);
        assert!(args.contains(&tail.as_str()), "{:?}", args);
        assert!(args.contains(&"org.example:app"));
        assert!(!args.contains(&"--also-make"));
    }

    #[test]
    fn test_nothing_staged_without_reactor_upstream() {
        let tmp = fixture();
        let modules: Vec<Arc<ForeignModule>> = reactor(&tmp).into_iter().map(Arc::new).collect();
        let index = ModuleIndex::build(modules.iter().cloned()).unwrap();
        assert!(reactor_upstream(&index, &modules[0]).is_empty());

        let mut upstream: Vec<String> = reactor_upstream(&index, &modules[1])
            .iter()
            .map(|m| m.coordinate().artifact().to_string())
            .collect();
        upstream.sort();
        assert_eq!(upstream, vec!["lib", "root"]);
    }
}
