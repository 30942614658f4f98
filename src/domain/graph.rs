//! Reference graphs over shapes and operations
//!
//! Edges point from the referencing shape/operation to the referenced shape.
//! Uses petgraph for storage; the dependency tree walk and ancestor search
//! run over it.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::document::ApiSpec;
use super::refs::{operation_refs, shape_refs, RefPolicy};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Operation '{0}' not found in the document")]
    OperationNotFound(String),

    #[error("Reference cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),
}

/// What the dependency tree walk does when a shape re-enters its own path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Fail with [`GraphError::CycleDetected`]
    #[default]
    Error,
    /// Print the repeated shape once more, without expanding it
    Truncate,
}

/// One line of a dependency tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub depth: usize,
}

impl TreeNode {
    fn new(name: impl Into<String>, depth: usize) -> Self {
        Self {
            name: name.into(),
            depth,
        }
    }
}

/// A directed reference graph keyed by shape/operation name
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    /// The underlying directed graph
    graph: DiGraph<String, ()>,

    /// Map from name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds the supported-subset graph used for printing one operation's tree
    ///
    /// Contains the operation's own references plus every shape's references
    /// under [`RefPolicy::Supported`].
    pub fn for_operation(spec: &ApiSpec, operation: &str) -> Result<Self, GraphError> {
        let op = spec
            .operation(operation)
            .ok_or_else(|| GraphError::OperationNotFound(operation.to_string()))?;

        let mut graph = Self::new();
        graph.add_node(operation);
        for target in operation_refs(op) {
            graph.add_reference(operation, target);
        }
        graph.add_shapes(spec, RefPolicy::Supported);

        debug!(
            operation,
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Built forward reference graph"
        );
        Ok(graph)
    }

    /// Builds the conservative shape-only graph used for reference counting
    ///
    /// Every edge is followed regardless of support flags. Read it backwards
    /// with [`referrers`](Self::referrers) and [`ancestors`](Self::ancestors).
    pub fn for_shapes(spec: &ApiSpec) -> Self {
        let mut graph = Self::new();
        graph.add_shapes(spec, RefPolicy::All);

        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Built reverse reference graph"
        );
        graph
    }

    fn add_shapes(&mut self, spec: &ApiSpec, policy: RefPolicy) {
        for (name, shape) in &spec.shapes {
            self.add_node(name);
            for target in shape_refs(shape, policy) {
                self.add_reference(name, target);
            }
        }
    }

    /// Adds a node if it is not present yet
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_map.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Adds a reference edge `from -> to`, ignoring duplicates
    ///
    /// Dangling targets become leaf nodes.
    pub fn add_reference(&mut self, from: &str, to: &str) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph.update_edge(from_idx, to_idx, ());
    }

    /// Returns the names `name` references directly
    pub fn references(&self, name: &str) -> BTreeSet<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Returns the names that reference `name` directly
    pub fn referrers(&self, name: &str) -> BTreeSet<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, dir: Direction) -> BTreeSet<&str> {
        match self.node_map.get(name) {
            Some(idx) => self
                .graph
                .neighbors_directed(*idx, dir)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Returns `name` plus every node that transitively references it
    ///
    /// Breadth-first over the reversed edges; each node is visited once.
    pub fn ancestors<'a>(&'a self, name: &'a str) -> HashSet<&'a str> {
        let Some(&start) = self.node_map.get(name) else {
            return HashSet::from([name]);
        };

        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut visited = HashSet::new();
        while let Some(idx) = bfs.next(reversed) {
            visited.insert(self.graph[idx].as_str());
        }
        visited
    }

    /// Walks the graph depth-first from `root` and returns the indented tree
    ///
    /// Children are visited in ascending name order. A node at depth 1 whose
    /// shape is flagged unsupported is dropped together with its subtree;
    /// deeper nodes are not re-checked. Shared nodes are repeated under every
    /// parent.
    pub fn dependency_tree(
        &self,
        spec: &ApiSpec,
        root: &str,
        on_cycle: CyclePolicy,
    ) -> Result<Vec<TreeNode>, GraphError> {
        let start = *self
            .node_map
            .get(root)
            .ok_or_else(|| GraphError::OperationNotFound(root.to_string()))?;

        let mut lines = Vec::new();
        let mut stack = vec![(start, 0usize)];
        // Nodes from the root down to the parent of the node being visited
        let mut path: Vec<NodeIndex> = Vec::new();

        while let Some((current, depth)) = stack.pop() {
            let name = self.graph[current].as_str();
            if depth == 1 && !spec.is_shape_supported(name) {
                continue;
            }

            path.truncate(depth);
            let reentry = path.iter().position(|idx| *idx == current);
            if let Some(pos) = reentry {
                if on_cycle == CyclePolicy::Error {
                    let mut cycle: Vec<String> =
                        path[pos..].iter().map(|idx| self.graph[*idx].clone()).collect();
                    cycle.push(name.to_string());
                    return Err(GraphError::CycleDetected(cycle));
                }
            }

            lines.push(TreeNode::new(name, depth));
            if reentry.is_some() {
                continue;
            }
            path.push(current);

            let mut children: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(current, Direction::Outgoing)
                .collect();
            // Descending push so the stack pops them in ascending order
            children.sort_unstable_by(|a, b| self.graph[*b].cmp(&self.graph[*a]));
            stack.extend(children.into_iter().map(|idx| (idx, depth + 1)));
        }

        debug!(root, lines = lines.len(), "Walked dependency tree");
        Ok(lines)
    }

    /// Returns true if the graph contains the name
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Returns the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns the number of distinct reference edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Builds the forward graph for `operation` and returns its dependency tree
pub fn dependency_tree(
    spec: &ApiSpec,
    operation: &str,
    on_cycle: CyclePolicy,
) -> Result<Vec<TreeNode>, GraphError> {
    ReferenceGraph::for_operation(spec, operation)?.dependency_tree(spec, operation, on_cycle)
}

/// Renders tree lines with `indent` spaces per depth level
pub fn render_tree(lines: &[TreeNode], indent: usize) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&" ".repeat(indent * line.depth));
        out.push_str(&line.name);
        out.push('\n');
    }
    out
}
