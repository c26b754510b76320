//! Named-node causal graph on top of [`petgraph`].
//!
//! # Edge Direction
//!
//! An edge `A → B` means "A causes B". Node names are unique; the graph
//! keeps a name → [`NodeIndex`] map alongside the petgraph storage so that
//! callers never handle raw indices.
//!
//! ## Undirected Projection
//!
//! [`CausalGraph::undirected`] returns an [`UnGraph`] with the same node
//! indices, collapsing `A → B` and `B → A` into one undirected edge. Path
//! search runs on the projection and classification runs on the directed
//! graph.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::Dfs;
use petgraph::Direction;

use crate::error::CausewayError;

/// A directed causal graph with uniquely named nodes.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    /// Directed graph: nodes = variable names, edges = causal arrows.
    pub graph: DiGraph<String, ()>,
    /// Mapping from variable name to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
}

impl CausalGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(cause, effect)` pairs.
    ///
    /// Nodes are created in first-mention order. Duplicate edges are dropped.
    #[must_use]
    pub fn from_edges(edges: &[(&str, &str)]) -> Self {
        let mut graph = Self::new();
        for (cause, effect) in edges {
            graph.add_edge(cause, effect);
        }
        graph
    }

    /// Insert a node if absent and return its index.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_map.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Insert `cause → effect`, creating either endpoint if needed.
    pub fn add_edge(&mut self, cause: &str, effect: &str) {
        let from = self.add_node(cause);
        let to = self.add_node(effect);
        // petgraph allows parallel edges by default.
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a variable name.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// Like [`Self::node_index`] but fails with [`CausewayError::NodeNotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a node of the graph.
    pub fn require_node(&self, name: &str) -> Result<NodeIndex, CausewayError> {
        self.node_index(name)
            .ok_or_else(|| CausewayError::NodeNotFound(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Return the variable name for a node.
    #[must_use]
    pub fn name(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// All variable names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.node_map.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// True when the directed edge `cause → effect` exists.
    ///
    /// Unknown names have no edges.
    #[must_use]
    pub fn has_edge(&self, cause: &str, effect: &str) -> bool {
        match (self.node_index(cause), self.node_index(effect)) {
            (Some(from), Some(to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Every node reachable from `name` along directed edges, excluding
    /// `name` itself, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a node of the graph.
    pub fn descendants(&self, name: &str) -> Result<Vec<String>, CausewayError> {
        let start = self.require_node(name)?;
        let mut dfs = Dfs::new(&self.graph, start);
        let mut out = Vec::new();
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                out.push(self.graph[idx].clone());
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    /// Direct causes of `name`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a node of the graph.
    pub fn parents(&self, name: &str) -> Result<Vec<String>, CausewayError> {
        let idx = self.require_node(name)?;
        let mut out: Vec<String> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Undirected projection sharing this graph's node indices.
    #[must_use]
    pub fn undirected(&self) -> UnGraph<String, ()> {
        let mut projection =
            UnGraph::<String, ()>::with_capacity(self.node_count(), self.edge_count());
        for idx in self.graph.node_indices() {
            projection.add_node(self.graph[idx].clone());
        }
        for edge in self.graph.raw_edges() {
            let (a, b) = (edge.source(), edge.target());
            if !projection.contains_edge(a, b) {
                projection.add_edge(a, b, ());
            }
        }
        projection
    }
}
