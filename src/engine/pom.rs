//! Raw `pom.xml` reading.
//!
//! This is a literal reading of one descriptor file: no inheritance, no
//! interpolation and no defaults. [`PomEngine`](super::PomEngine) turns raw
//! descriptors into effective modules.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::engine::EngineError;

/// Default group of build plugins.
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParent {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    /// `None` when absent, `Some("")` for an explicit empty element
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDependency {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    pub type_: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    pub exclusions: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlugin {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    pub extensions: bool,
    pub goals: Vec<String>,
    pub dependencies: Vec<RawDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtension {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
}

/// The parts a profile can contribute as well as the project itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSection {
    pub properties: BTreeMap<String, String>,
    pub modules: Vec<String>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
    pub plugins: Vec<RawPlugin>,
    pub plugin_management: Vec<RawPlugin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProfile {
    pub id: Option<String>,
    pub active_by_default: bool,
    pub section: RawSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBuild {
    pub directory: Option<String>,
    pub final_name: Option<String>,
    pub source_directory: Option<String>,
    pub test_source_directory: Option<String>,
    pub extensions: Vec<RawExtension>,
}

/// One descriptor as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPom {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub name: Option<String>,
    pub parent: Option<RawParent>,
    pub build: RawBuild,
    pub section: RawSection,
    pub profiles: Vec<RawProfile>,
}

/// Read and parse the descriptor at `path`.
pub fn read(path: &Path) -> Result<RawPom, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path)
}

/// Parse descriptor text. `path` is only used for error messages.
pub fn parse(content: &str, path: &Path) -> Result<RawPom, EngineError> {
    let mut reader = Reader::from_str(content);
    let mut parser = PomParser::default();
    let mut buf = Vec::new();

    let parse_error = |message: String| EngineError::Parse {
        path: path.to_path_buf(),
        message,
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                parser.start(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Empty(e)) => {
                parser.start(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                parser.end();
            }
            Ok(Event::End(_)) => parser.end(),
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| parse_error(e.to_string()))?;
                parser.text.push_str(&text);
            }
            Ok(Event::CData(t)) => {
                parser.text.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !parser.seen_project {
        return Err(parse_error("missing <project> root element".to_string()));
    }

    Ok(parser.pom)
}

#[derive(Default)]
struct PomParser {
    stack: Vec<String>,
    text: String,
    seen_project: bool,
    pom: RawPom,
    profile: Option<RawProfile>,
    dependency: Option<RawDependency>,
    exclusion: Option<(String, String)>,
    plugin: Option<RawPlugin>,
    extension: Option<RawExtension>,
}

impl PomParser {
    fn start(&mut self, name: String) {
        let parent = self.stack.last().map(String::as_str);
        match (parent, name.as_str()) {
            (None, "project") => self.seen_project = true,
            (Some("profiles"), "profile") => self.profile = Some(RawProfile::default()),
            (Some("dependencies"), "dependency") => self.dependency = Some(RawDependency::default()),
            (Some("exclusions"), "exclusion") => self.exclusion = Some(Default::default()),
            (Some("plugins"), "plugin") => self.plugin = Some(RawPlugin::default()),
            (Some("extensions"), "extension") => self.extension = Some(RawExtension::default()),
            _ => {}
        }
        self.stack.push(name);
        self.text.clear();
    }

    fn end(&mut self) {
        let value = self.text.trim().to_string();
        self.text.clear();

        let stack = std::mem::take(&mut self.stack);
        let path: Vec<&str> = stack.iter().map(String::as_str).collect();
        self.element(&path, value);
        self.stack = stack;
        self.stack.pop();
    }

    fn element(&mut self, path: &[&str], value: String) {
        let (in_profile, rel) = match path {
            ["project", "profiles", "profile", rest @ ..] => (true, rest),
            ["project", rest @ ..] => (false, rest),
            _ => return,
        };

        let section = match (in_profile, self.profile.as_mut()) {
            (true, Some(profile)) => &mut profile.section,
            _ => &mut self.pom.section,
        };

        match rel {
            [] if in_profile => {
                if let Some(profile) = self.profile.take() {
                    self.pom.profiles.push(profile);
                }
            }
            ["id"] if in_profile => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.id = Some(value);
                }
            }
            ["activation", "activeByDefault"] if in_profile => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.active_by_default = value == "true";
                }
            }

            ["groupId"] if !in_profile => self.pom.group = Some(value),
            ["artifactId"] if !in_profile => self.pom.artifact = Some(value),
            ["version"] if !in_profile => self.pom.version = Some(value),
            ["packaging"] if !in_profile => self.pom.packaging = Some(value),
            ["name"] if !in_profile => self.pom.name = Some(value),

            ["parent", field] if !in_profile => {
                let parent = self.pom.parent.get_or_insert_with(RawParent::default);
                match *field {
                    "groupId" => parent.group = Some(value),
                    "artifactId" => parent.artifact = Some(value),
                    "version" => parent.version = Some(value),
                    "relativePath" => parent.relative_path = Some(value),
                    _ => {}
                }
            }

            ["properties", key] => {
                section.properties.insert(key.to_string(), value);
            }
            ["modules", "module"] => section.modules.push(value),

            [.., "exclusions", "exclusion", field] => {
                if let Some(exclusion) = self.exclusion.as_mut() {
                    match *field {
                        "groupId" => exclusion.0 = value,
                        "artifactId" => exclusion.1 = value,
                        _ => {}
                    }
                }
            }
            [.., "exclusions", "exclusion"] => {
                if let (Some(exclusion), Some(dep)) =
                    (self.exclusion.take(), self.dependency.as_mut())
                {
                    dep.exclusions.push(exclusion);
                }
            }
            [.., "dependencies", "dependency", field] => {
                if let Some(dep) = self.dependency.as_mut() {
                    match *field {
                        "groupId" => dep.group = Some(value),
                        "artifactId" => dep.artifact = Some(value),
                        "version" => dep.version = Some(value),
                        "type" => dep.type_ = Some(value),
                        "classifier" => dep.classifier = Some(value),
                        "scope" => dep.scope = Some(value),
                        "optional" => dep.optional = Some(value),
                        _ => {}
                    }
                }
            }
            ["dependencies", "dependency"] => {
                if let Some(dep) = self.dependency.take() {
                    section.dependencies.push(dep);
                }
            }
            ["dependencyManagement", "dependencies", "dependency"] => {
                if let Some(dep) = self.dependency.take() {
                    section.dependency_management.push(dep);
                }
            }
            ["build", .., "plugin", "dependencies", "dependency"] => {
                if let (Some(dep), Some(plugin)) = (self.dependency.take(), self.plugin.as_mut()) {
                    plugin.dependencies.push(dep);
                }
            }

            ["build", .., "plugin", "executions", "execution", "goals", "goal"] => {
                if let Some(plugin) = self.plugin.as_mut() {
                    plugin.goals.push(value);
                }
            }
            ["build", .., "plugins", "plugin", field] => {
                if let Some(plugin) = self.plugin.as_mut() {
                    match *field {
                        "groupId" => plugin.group = Some(value),
                        "artifactId" => plugin.artifact = Some(value),
                        "version" => plugin.version = Some(value),
                        "extensions" => plugin.extensions = value == "true",
                        _ => {}
                    }
                }
            }
            ["build", "plugins", "plugin"] => {
                if let Some(plugin) = self.plugin.take() {
                    section.plugins.push(plugin);
                }
            }
            ["build", "pluginManagement", "plugins", "plugin"] => {
                if let Some(plugin) = self.plugin.take() {
                    section.plugin_management.push(plugin);
                }
            }

            ["build", "extensions", "extension", field] if !in_profile => {
                if let Some(extension) = self.extension.as_mut() {
                    match *field {
                        "groupId" => extension.group = Some(value),
                        "artifactId" => extension.artifact = Some(value),
                        "version" => extension.version = Some(value),
                        _ => {}
                    }
                }
            }
            ["build", "extensions", "extension"] if !in_profile => {
                if let Some(extension) = self.extension.take() {
                    self.pom.build.extensions.push(extension);
                }
            }
            ["build", field] if !in_profile => match *field {
                "directory" => self.pom.build.directory = Some(value),
                "finalName" => self.pom.build.final_name = Some(value),
                "sourceDirectory" => self.pom.build.source_directory = Some(value),
                "testSourceDirectory" => self.pom.build.test_source_directory = Some(value),
                _ => {}
            },
            _ => {}
        }
    }
}
