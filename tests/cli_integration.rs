//! CLI integration tests for include-maven.
//!
//! These tests include a small Maven build from `include-maven.toml` and
//! inspect the translated model. Builds run against a `mvnw` script in the
//! build's root that records its arguments instead of running Maven.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the include-maven binary command.
fn include_maven() -> Command {
    Command::cargo_bin("include-maven").unwrap()
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn module_pom(artifact: &str, dependencies: &str) -> String {
    format!(
        r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>{}</artifactId>
  <dependencies>{}</dependencies>
</project>
"#,
        artifact, dependencies
    )
}

/// A workspace including the build `maven` with modules `core` and `app`,
/// where `app` depends on `core`.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "include-maven.toml",
        r#"
[[build]]
name = "maven"
root-directory = "backend"
local-repository = "repo"
"#,
    );
    write(
        tmp.path(),
        "backend/pom.xml",
        r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>parent</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <modules>
    <module>core</module>
    <module>app</module>
  </modules>
</project>
"#,
    );
    write(tmp.path(), "backend/core/pom.xml", &module_pom("core", ""));
    write(
        tmp.path(),
        "backend/app/pom.xml",
        &module_pom(
            "app",
            r#"
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>core</artifactId>
      <version>${project.version}</version>
    </dependency>
  "#,
        ),
    );
    tmp
}

// ============================================================================
// include-maven projects
// ============================================================================

#[test]
fn test_projects_lists_every_module() {
    let tmp = workspace();

    include_maven()
        .arg("projects")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("org.example:parent:1.0 -> :maven:parent [pom]"))
        .stdout(predicate::str::contains("org.example:core:1.0 -> :maven:core [jar]"))
        .stdout(predicate::str::contains("org.example:app:1.0 -> :maven:app [jar]"));
}

#[test]
fn test_projects_from_subdirectory() {
    let tmp = workspace();

    include_maven()
        .arg("projects")
        .current_dir(tmp.path().join("backend/app"))
        .assert()
        .success()
        .stdout(predicate::str::contains(":maven:app"));
}

#[test]
fn test_projects_json() {
    let tmp = workspace();

    include_maven()
        .args(["projects", "--message-format", "json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""path":":maven:core""#));
}

#[test]
fn test_fails_without_config() {
    let tmp = TempDir::new().unwrap();

    include_maven()
        .arg("projects")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find include-maven.toml"));
}

#[test]
fn test_json_error_line() {
    let tmp = TempDir::new().unwrap();

    include_maven()
        .args(["projects", "--message-format", "json"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""reason":"error""#))
        .stdout(predicate::str::contains("could not find include-maven.toml"));
}

#[test]
fn test_duplicate_coordinates_fail() {
    let tmp = workspace();
    // `app` now claims the coordinate of `core`
    write(tmp.path(), "backend/app/pom.xml", &module_pom("core", ""));

    include_maven()
        .arg("projects")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("org.example:core:1.0"))
        .stderr(predicate::str::contains("unique"));
}

// ============================================================================
// include-maven dependencies
// ============================================================================

#[test]
fn test_dependencies_point_at_projects() {
    let tmp = workspace();

    include_maven()
        .args(["dependencies", ":maven:app", "--configuration", "api"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("project ':maven:core'"))
        .stdout(predicate::str::contains("platform(project ':maven:parent')"));
}

#[test]
fn test_dependencies_unknown_project() {
    let tmp = workspace();

    include_maven()
        .args(["dependencies", ":maven:nope"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("project ':maven:nope' not found"));
}

// ============================================================================
// include-maven tasks
// ============================================================================

#[test]
fn test_tasks_of_project() {
    let tmp = workspace();

    include_maven()
        .args(["tasks", ":maven:core"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mavenBuild (build)"))
        .stdout(predicate::str::contains("mavenInfo (include-maven)"));
}

#[test]
fn test_tasks_execution_order() {
    let tmp = workspace();

    let output = include_maven()
        .args(["tasks", ":maven:app:build"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    let position = |task: &str| lines.iter().position(|l| *l == task).unwrap();
    assert!(position(":maven:core:mavenBuild") < position(":maven:app:mavenBuild"));
    assert!(position(":maven:app:mavenBuild") < position(":maven:app:build"));
}

#[test]
fn test_build_dry_run() {
    let tmp = workspace();

    include_maven()
        .args(["build", ":maven:core:mavenBuild", "--dry-run"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(":maven:parent:mavenBuild"))
        .stdout(predicate::str::contains(":maven:core:mavenBuild"))
        .stdout(predicate::str::contains(":maven:app:mavenBuild").not());
}

/// Install a `mvnw` in the Maven build's root that appends its arguments to
/// `backend/invocations.log`, then runs `extra`.
#[cfg(unix)]
fn fake_maven(dir: &Path, extra: &str) {
    use std::os::unix::fs::PermissionsExt;
    write(
        dir,
        "backend/mvnw",
        &format!(
            "#!/bin/sh\necho \"$*\" >> \"$(dirname \"$0\")/invocations.log\"\n{}\n",
            extra
        ),
    );
    fs::set_permissions(dir.join("backend/mvnw"), fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
fn invocations(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("backend/invocations.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(unix)]
#[test]
fn test_build_runs_upstream_modules_first() {
    let tmp = workspace();
    fake_maven(tmp.path(), "exit 0");

    include_maven()
        .args(["build", ":maven:app:mavenBuild", "--jobs", "1"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let lines = invocations(tmp.path());
    let position = |ga: &str| {
        let selected = format!("--projects {}", ga);
        lines.iter().position(|l| l.contains(&selected)).unwrap()
    };
    assert_eq!(lines.len(), 3);
    assert!(position("org.example:parent") < position("org.example:core"));
    assert!(position("org.example:core") < position("org.example:app"));

    // app's execution resolves core from the reactor before the local repository
    let app = &lines[position("org.example:app")];
    let staging = tmp.path().join("backend/target/include-maven/org.example.app");
    assert!(app.contains(&format!("-Dmaven.repo.local={}", staging.display())));
    assert!(app.contains("-Dmaven.repo.local.tail="));
    assert!(staging.join("org/example/core/1.0/core-1.0.pom").is_file());
    assert!(staging.join("org/example/parent/1.0/parent-1.0.pom").is_file());
}

#[cfg(unix)]
#[test]
fn test_build_failure_stops_dependents() {
    let tmp = workspace();
    fake_maven(
        tmp.path(),
        r#"case "$*" in *org.example:core*) echo "compilation failure"; exit 1;; esac"#,
    );

    include_maven()
        .args(["build", ":maven:app:mavenBuild"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("task ':maven:core:mavenBuild' failed"))
        .stderr(predicate::str::contains("compilation failure"));

    let lines = invocations(tmp.path());
    assert!(lines.iter().any(|l| l.contains("org.example:core")));
    assert!(!lines.iter().any(|l| l.contains("org.example:app")));
}

// ============================================================================
// include-maven model / completions
// ============================================================================

#[test]
fn test_model_dumps_project() {
    let tmp = workspace();

    include_maven()
        .args(["model", ":maven:core"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""jarMavenArtifact""#))
        .stdout(predicate::str::contains(r#""mavenBuild""#));
}

#[test]
fn test_completions() {
    include_maven()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("include-maven"));
}
