//! Module fixtures for common test scenarios.

use std::path::Path;

use crate::core::{Coordinate, Dependency, ForeignModule};

/// Group of every fixture module.
pub const GROUP: &str = "org.example";

/// Version of every fixture module.
pub const VERSION: &str = "1.0";

/// Artifact id of the fixture root module.
pub const ROOT_ARTIFACT: &str = "parent";

pub fn coordinate(artifact: &str) -> Coordinate {
    Coordinate::new(GROUP, artifact, VERSION)
}

/// The aggregator at `<dir>/pom.xml`.
pub fn root_module(dir: &Path) -> ForeignModule {
    ForeignModule::new(coordinate(ROOT_ARTIFACT), "pom", dir.join("pom.xml"))
}

/// A jar module at `<dir>/<artifact>/pom.xml`, parented by the root module.
pub fn jar_module(dir: &Path, artifact: &str) -> ForeignModule {
    ForeignModule::new(
        coordinate(artifact),
        "jar",
        dir.join(artifact).join("pom.xml"),
    )
    .with_parents(vec![coordinate(ROOT_ARTIFACT)])
}

/// A dependency on the fixture module `artifact` in `scope`.
pub fn dependency(artifact: &str, scope: &str) -> Dependency {
    Dependency::new(GROUP, artifact, Some(VERSION.to_string())).with_scope(scope)
}

/// Root plus modules `a` and `b`, where `b` has a compile dependency on `a`.
///
/// Returns the root and the reactor in declaration order.
pub fn two_module_build(dir: &Path) -> (ForeignModule, Vec<ForeignModule>) {
    let root = root_module(dir);
    let a = jar_module(dir, "a");
    let b = jar_module(dir, "b").with_dependency(dependency("a", "compile"));
    (root.clone(), vec![root, a, b])
}
