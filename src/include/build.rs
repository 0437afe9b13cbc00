//! A discovered included build.

use std::sync::Arc;

use crate::core::{ForeignModule, ModuleIndex};
use crate::engine::{ForeignEngine, Session};
use crate::include::config::IncludedBuildConfig;

/// Result of discovering one included build.
///
/// Owns the engine instance of the build; engines are never shared between
/// included builds. Everything in here is read-only once discovery returns.
pub struct IncludedBuild {
    config: IncludedBuildConfig,
    engine: Arc<dyn ForeignEngine>,
    root: Arc<ForeignModule>,
    reactor: Vec<Arc<ForeignModule>>,
    index: Arc<ModuleIndex>,
    session: Session,
}

impl IncludedBuild {
    pub(crate) fn new(
        config: IncludedBuildConfig,
        engine: Arc<dyn ForeignEngine>,
        root: Arc<ForeignModule>,
        reactor: Vec<Arc<ForeignModule>>,
        index: Arc<ModuleIndex>,
        session: Session,
    ) -> Self {
        IncludedBuild {
            config,
            engine,
            root,
            reactor,
            index,
            session,
        }
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn config(&self) -> &IncludedBuildConfig {
        &self.config
    }

    pub fn engine(&self) -> &dyn ForeignEngine {
        self.engine.as_ref()
    }

    /// The module of the root descriptor.
    pub fn root(&self) -> &Arc<ForeignModule> {
        &self.root
    }

    /// The root module followed by every other module in build order.
    pub fn reactor(&self) -> &[Arc<ForeignModule>] {
        &self.reactor
    }

    pub fn index(&self) -> &Arc<ModuleIndex> {
        &self.index
    }

    /// The session used for discovery. Module builds are seeded from it.
    pub fn discovery_session(&self) -> &Session {
        &self.session
    }
}

impl std::fmt::Debug for IncludedBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncludedBuild")
            .field("name", &self.config.name())
            .field("root", &self.root.coordinate())
            .field("modules", &self.reactor.len())
            .finish()
    }
}
