//! Inclusion of every configured build into a native model.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::engine::{ForeignEngine, PomEngine};
use crate::include::{
    DiscoveryError, GraphDiscoverer, HostSettings, IdentityMap, IncludedBuild,
    IncludedBuildConfig, ProjectConfigurer,
};
use crate::native::BuildModel;
use crate::util::config::{config_path, IncludeConfig};

/// A native model with every included build translated into it.
#[derive(Debug)]
pub struct Workspace {
    pub model: BuildModel,
    pub builds: Vec<Arc<IncludedBuild>>,
    pub identities: Arc<IdentityMap>,
    pub config: IncludeConfig,
}

/// Included builds and the identity map they were registered under.
#[derive(Debug)]
pub struct Inclusion {
    pub builds: Vec<Arc<IncludedBuild>>,
    pub identities: Arc<IdentityMap>,
}

/// Include `builds` into `model`.
///
/// Every build is discovered before any project is registered, every
/// project is registered before any is configured. The identity map is
/// frozen between registration and configuration.
pub fn include_maven_builds(
    model: &mut BuildModel,
    builds: Vec<(IncludedBuildConfig, Arc<dyn ForeignEngine>)>,
    host: HostSettings,
) -> Result<Inclusion> {
    let mut discovered = Vec::with_capacity(builds.len());
    for (config, engine) in builds {
        let name = config.name().to_string();
        let build = GraphDiscoverer::new(config, engine)
            .with_host_settings(host)
            .discover()
            .with_context(|| format!("failed to include Maven build '{}'", name))?;
        discovered.push(Arc::new(build));
    }

    let mut identities = IdentityMap::new();
    for build in &discovered {
        register_projects(model, build, &mut identities)
            .with_context(|| format!("failed to include Maven build '{}'", build.name()))?;
    }
    let identities = Arc::new(identities);

    for build in &discovered {
        for module in build.reactor() {
            let ga = module.group_artifact();
            let Some(path) = identities.get(&ga).cloned() else {
                continue;
            };
            let project = model.project_mut(&path)?;
            ProjectConfigurer::new(Arc::clone(build), Arc::clone(module), Arc::clone(&identities))
                .configure(project)
                .with_context(|| format!("failed to configure project '{}'", path))?;
        }
    }

    Ok(Inclusion {
        builds: discovered,
        identities,
    })
}

fn register_projects(
    model: &mut BuildModel,
    build: &IncludedBuild,
    identities: &mut IdentityMap,
) -> Result<(), DiscoveryError> {
    let registration = |source| DiscoveryError::Registration {
        build: build.name().to_string(),
        source,
    };

    for module in build.reactor() {
        let ga = module.group_artifact();
        if identities.contains(&ga) {
            tracing::warn!(
                "{} is included by more than one build, keeping the first",
                ga
            );
            continue;
        }

        let path = build.config().project_path(&ga).map_err(registration)?;
        let name = build.config().project_name(&ga);
        tracing::debug!(
            "Including Maven build's '{}' project '{}' ({}) as Gradle project path '{}'",
            build.name(),
            ga,
            module.base_dir().display(),
            path
        );

        let project = model
            .include(path.clone(), module.base_dir(), name)
            .map_err(registration)?;
        project.build_file_name = build.config().build_file_name().map(str::to_string);
        identities.insert(ga, path);
    }
    Ok(())
}

/// Load `include-maven.toml` from `root` and include every build it names,
/// each with its own [`PomEngine`].
pub fn load_workspace(root: &Path, host: HostSettings) -> Result<Workspace> {
    let path = config_path(root);
    let config = IncludeConfig::load(&path)?;
    let host = HostSettings {
        offline: host.offline || config.settings.offline,
        ..host
    };

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    let mut model = BuildModel::new(root, root_name);

    let builds = config
        .build_configs(root)?
        .into_iter()
        .map(|c| (c, Arc::new(PomEngine::new()) as Arc<dyn ForeignEngine>))
        .collect();
    let inclusion = include_maven_builds(&mut model, builds, host)?;

    Ok(Workspace {
        model,
        builds: inclusion.builds,
        identities: inclusion.identities,
        config,
    })
}
