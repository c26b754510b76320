//! Collider / non-collider classification along paths.
//!
//! For each path the extractor walks consecutive triples `(a, b, c)`. `b` is
//! a **collider** when both `a → b` and `c → b` exist in the directed graph.
//! Every collider contributes its descendants and itself to the path's
//! `colliders_desc` collection. Interior nodes that are not in that
//! collection are **non-colliders**.
//!
//! `colliders_desc` is fully built before any node is classified as a
//! non-collider, so a node that is a descendant of a later collider is never
//! reported as a non-collider.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::graph::CausalGraph;

/// Column names of an [`AdjustmentTable`], in order.
pub const COLUMNS: [&str; 3] = ["path", "colliders_desc", "non_colliders"];

/// Adjustment information derived from a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub path: Vec<String>,
    /// Colliders on the path and all of their descendants, without duplicates.
    pub colliders_desc: Vec<String>,
    /// Interior nodes not in `colliders_desc`, in path order.
    pub non_colliders: Vec<String>,
}

/// One [`AdjustmentRecord`] per input path, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdjustmentTable {
    pub rows: Vec<AdjustmentRecord>,
}

impl AdjustmentTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AdjustmentRecord> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a AdjustmentTable {
    type Item = &'a AdjustmentRecord;
    type IntoIter = std::slice::Iter<'a, AdjustmentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// True when both `prev → node` and `next → node` exist.
#[must_use]
pub fn is_collider(graph: &CausalGraph, prev: &str, node: &str, next: &str) -> bool {
    graph.has_edge(prev, node) && graph.has_edge(next, node)
}

/// Collider nodes on `path`, in path order. Endpoints are never colliders.
#[must_use]
pub fn colliders_on_path<'p>(graph: &CausalGraph, path: &'p [String]) -> Vec<&'p str> {
    path.windows(3)
        .filter(|w| is_collider(graph, &w[0], &w[1], &w[2]))
        .map(|w| w[1].as_str())
        .collect()
}

/// Classify a single path.
#[must_use]
pub fn classify_path(graph: &CausalGraph, path: &[String]) -> AdjustmentRecord {
    let mut colliders_desc: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for collider in colliders_on_path(graph, path) {
        // Colliders have incoming edges, so they are always graph nodes.
        let descendants = graph.descendants(collider).unwrap_or_default();
        for name in descendants.into_iter().chain(std::iter::once(collider.to_string())) {
            if seen.insert(name.clone()) {
                colliders_desc.push(name);
            }
        }
    }

    let interior: &[String] = match path {
        [_, interior @ .., _] => interior,
        _ => &[],
    };
    let non_colliders = interior
        .iter()
        .filter(|node| !seen.contains(node.as_str()))
        .cloned()
        .collect();

    AdjustmentRecord {
        path: path.to_vec(),
        colliders_desc,
        non_colliders,
    }
}

/// Build the adjustment table for `paths`.
///
/// Empty input yields an empty table.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn adjustment_variables(graph: &CausalGraph, paths: &[Vec<String>]) -> AdjustmentTable {
    let rows: Vec<AdjustmentRecord> = paths.iter().map(|path| classify_path(graph, path)).collect();
    trace!(rows = rows.len(), "built adjustment table");
    AdjustmentTable { rows }
}
