//! Static dependency graph over registered modules.
//!
//! The resolver discovers dependencies lazily while walking from a requested
//! module. This graph is the whole-registry view of the same edges, used to
//! validate a container up front, to compute a construction order for all
//! modules, and to render dependency trees, without running any factory.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::ContainerError;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current DFS path.
    Gray,
    /// Node and everything below it have been visited.
    Black,
}

/// Directed graph where an edge `a -> b` means module `a` depends on `b`.
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a module to the graph if it isn't there yet.
    pub fn add_module(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    /// Record that `from` depends on `to`.
    ///
    /// Each call adds its own edge, so a name listed twice in a dependency
    /// list shows up twice, just as its value is passed to the factory twice.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.add_module(from);
        let to_idx = self.add_module(to);
        self.graph.add_edge(from_idx, to_idx, ());
    }

    /// Detect cycles using DFS with colors.
    ///
    /// A gray neighbor is a back-edge onto the current path; a black neighbor
    /// was reached through another branch (a diamond) and is not a cycle.
    pub fn detect_cycles(&self) -> Result<(), ContainerError> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let chain = cycle.iter().map(|idx| self.graph[*idx].as_str()).collect::<Vec<_>>();
                return Err(ContainerError::CircularDependency {
                    chain: chain.join(" -> "),
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.ordered_neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// All modules ordered so that every module comes after its dependencies.
    pub fn topological_order(&self) -> Result<Vec<String>, ContainerError> {
        self.detect_cycles()?;

        let indices = toposort(&self.graph, None).map_err(|cycle| {
            ContainerError::CircularDependency {
                chain: self.graph[cycle.node_id()].clone(),
            }
        })?;
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Every module `name` depends on, directly or indirectly.
    pub fn transitive_dependencies(&self, name: &str) -> HashSet<String> {
        let mut deps = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_map.get(name) {
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if deps.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        deps
    }

    /// Direct dependencies of `name`, in the order they were added.
    pub fn direct_dependencies(&self, name: &str) -> Vec<String> {
        match self.node_map.get(name) {
            Some(&idx) => {
                self.ordered_neighbors(idx).into_iter().map(|n| self.graph[n].clone()).collect()
            }
            None => Vec::new(),
        }
    }

    // petgraph yields neighbors newest-first
    fn ordered_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.reverse();
        neighbors
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the dependency tree below `root`.
    ///
    /// Modules already printed on another branch are shown once more without
    /// their children; modules that close a cycle are marked as such.
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = format!("{root}\n");
        let mut expanded = HashSet::new();
        let mut path = vec![root.to_string()];
        expanded.insert(root.to_string());

        let deps = self.direct_dependencies(root);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, &mut result, "", i == deps.len() - 1, &mut expanded, &mut path);
        }
        result
    }

    fn build_tree_string(
        &self,
        node: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        expanded: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if path.iter().any(|n| n == node) {
            result.push_str(&format!("{prefix}{connector}{node} (circular reference)\n"));
            return;
        }
        if !expanded.insert(node.to_string()) {
            result.push_str(&format!("{prefix}{connector}{node} (*)\n"));
            return;
        }
        result.push_str(&format!("{prefix}{connector}{node}\n"));

        path.push(node.to_string());
        let deps = self.direct_dependencies(node);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, result, &child_prefix, i == deps.len() - 1, expanded, path);
        }
        path.pop();
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
