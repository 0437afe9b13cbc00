//! Task graph resolution.
//!
//! Declared task dependencies are expanded to concrete tasks, following
//! project dependencies through bucket closures where a task depends on
//! "the same task in related projects". The result is an execution order
//! in which every task follows everything it depends on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::native::project::{BuildModel, Project, ProjectPath, TaskPath};
use crate::native::task::TaskDependency;
use crate::native::ModelError;

/// Resolved tasks of one invocation.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    order: Vec<TaskPath>,
    dependencies: BTreeMap<TaskPath, Vec<TaskPath>>,
}

impl TaskGraph {
    /// Resolve `requested` and everything it depends on.
    pub fn build(model: &BuildModel, requested: &[TaskPath]) -> Result<Self, ModelError> {
        // Edges point from a dependency to the task depending on it.
        let mut graph: DiGraph<TaskPath, ()> = DiGraph::new();
        let mut nodes: HashMap<TaskPath, NodeIndex> = HashMap::new();
        let mut dependencies = BTreeMap::new();

        let mut pending: Vec<TaskPath> = Vec::new();
        for task in requested {
            if add_node(&mut graph, &mut nodes, task) {
                pending.push(task.clone());
            }
        }
        pending.reverse();

        while let Some(task) = pending.pop() {
            let resolved = resolve_dependencies(model, &task)?;
            let dependent = nodes[&task];
            for dependency in &resolved {
                if add_node(&mut graph, &mut nodes, dependency) {
                    pending.push(dependency.clone());
                }
                graph.add_edge(nodes[dependency], dependent, ());
            }
            dependencies.insert(task, resolved);
        }

        let sorted = toposort(&graph, None)
            .map_err(|cycle| ModelError::TaskCycle(cycle_members(&graph, cycle.node_id())))?;
        let order = sorted.into_iter().map(|n| graph[n].clone()).collect();

        Ok(TaskGraph {
            order,
            dependencies,
        })
    }

    /// Tasks in execution order.
    pub fn order(&self) -> &[TaskPath] {
        &self.order
    }

    /// Direct dependencies of `task`.
    pub fn dependencies_of(&self, task: &TaskPath) -> &[TaskPath] {
        self.dependencies
            .get(task)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, task: &TaskPath) -> bool {
        self.dependencies.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Add `task` unless it is already a node. Returns whether it was added.
fn add_node(
    graph: &mut DiGraph<TaskPath, ()>,
    nodes: &mut HashMap<TaskPath, NodeIndex>,
    task: &TaskPath,
) -> bool {
    if nodes.contains_key(task) {
        return false;
    }
    nodes.insert(task.clone(), graph.add_node(task.clone()));
    true
}

/// Members of the strongly connected component containing `node`, sorted,
/// with the first repeated at the end.
fn cycle_members(graph: &DiGraph<TaskPath, ()>, node: NodeIndex) -> Vec<String> {
    let component = kosaraju_scc(graph)
        .into_iter()
        .find(|c| c.contains(&node))
        .unwrap_or_else(|| vec![node]);
    let mut members: Vec<String> = component.iter().map(|&n| graph[n].to_string()).collect();
    members.sort();
    if let Some(first) = members.first().cloned() {
        members.push(first);
    }
    members
}

/// Concrete tasks `task` depends on, in declaration order.
pub fn resolve_dependencies(
    model: &BuildModel,
    task: &TaskPath,
) -> Result<Vec<TaskPath>, ModelError> {
    let project = model.project(&task.project)?;
    let declared = model.task(task)?;

    let mut resolved = Vec::new();
    let mut push = |path: TaskPath| {
        if &path != task && !resolved.contains(&path) {
            resolved.push(path);
        }
    };

    for dependency in &declared.depends_on {
        match dependency {
            TaskDependency::Task { path } => {
                model.task(path)?;
                push(path.clone());
            }
            TaskDependency::FromProjectDependencies {
                configuration,
                use_depended_on: true,
                task: name,
            } => {
                for target in depended_on(project, configuration) {
                    let target = model.project(&target)?;
                    if target.task(name).is_some() {
                        push(TaskPath::new(target.path.clone(), name.clone()));
                    }
                }
            }
            TaskDependency::FromProjectDependencies {
                configuration,
                use_depended_on: false,
                task: name,
            } => {
                for dependent in model.projects() {
                    if dependent.path == project.path || dependent.task(name).is_none() {
                        continue;
                    }
                    if depended_on(dependent, configuration).contains(&project.path) {
                        push(TaskPath::new(dependent.path.clone(), name.clone()));
                    }
                }
            }
        }
    }
    Ok(resolved)
}

/// Projects referenced by the project dependencies of `configuration` and
/// the buckets it extends, excluding `project` itself.
fn depended_on(project: &Project, configuration: &str) -> BTreeSet<ProjectPath> {
    project
        .all_dependencies(configuration)
        .into_iter()
        .filter_map(|d| d.project_path())
        .filter(|p| **p != project.path)
        .cloned()
        .collect()
}
