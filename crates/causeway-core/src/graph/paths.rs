//! Simple-path enumeration and backdoor-path filtering.
//!
//! Paths are enumerated on the undirected projection of the causal graph
//! (see [`CausalGraph::undirected`]) with [`petgraph::algo::all_simple_paths`],
//! then filtered by a [`BackdoorTest`]. Enumeration is exponential in the
//! worst case; callers that work with dense graphs should bound path length
//! with [`find_backdoor_paths_bounded`].

use petgraph::algo::all_simple_paths;
use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use super::build::CausalGraph;
use crate::error::CausewayError;

/// Decides whether a path between `source` and `target` is a backdoor path.
pub trait BackdoorTest {
    fn is_backdoor(&self, graph: &CausalGraph, source: &str, target: &str, path: &[String])
    -> bool;
}

/// A path is a backdoor path when its first edge points into the source.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncomingEdgeBackdoor;

impl BackdoorTest for IncomingEdgeBackdoor {
    fn is_backdoor(
        &self,
        graph: &CausalGraph,
        _source: &str,
        _target: &str,
        path: &[String],
    ) -> bool {
        match path {
            [first, second, ..] => graph.has_edge(second, first),
            _ => false,
        }
    }
}

/// Every simple path from `source` to `target` in the undirected projection.
///
/// Returns an empty list when `source == target` or the nodes are not
/// connected.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if either node is missing.
pub fn all_simple_paths_between(
    graph: &CausalGraph,
    source: &str,
    target: &str,
    max_intermediate_nodes: Option<usize>,
) -> Result<Vec<Vec<String>>, CausewayError> {
    let from = graph.require_node(source)?;
    let to = graph.require_node(target)?;
    if from == to {
        return Ok(Vec::new());
    }

    let projection = graph.undirected();
    let paths = all_simple_paths::<Vec<NodeIndex>, _>(&projection, from, to, 0, max_intermediate_nodes)
        .map(|path| path.into_iter().map(|idx| projection[idx].clone()).collect())
        .collect();
    Ok(paths)
}

/// Backdoor paths between `source` and `target`, in enumeration order.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if either node is missing.
pub fn find_backdoor_paths<T: BackdoorTest + ?Sized>(
    graph: &CausalGraph,
    source: &str,
    target: &str,
    test: &T,
) -> Result<Vec<Vec<String>>, CausewayError> {
    find_backdoor_paths_bounded(graph, source, target, test, None)
}

/// [`find_backdoor_paths`] limited to paths with at most
/// `max_intermediate_nodes` interior nodes.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if either node is missing.
#[instrument(skip(graph, test))]
pub fn find_backdoor_paths_bounded<T: BackdoorTest + ?Sized>(
    graph: &CausalGraph,
    source: &str,
    target: &str,
    test: &T,
    max_intermediate_nodes: Option<usize>,
) -> Result<Vec<Vec<String>>, CausewayError> {
    let candidates = all_simple_paths_between(graph, source, target, max_intermediate_nodes)?;
    let total = candidates.len();
    let backdoor: Vec<Vec<String>> = candidates
        .into_iter()
        .filter(|path| test.is_backdoor(graph, source, target, path))
        .collect();

    debug!(total, backdoor = backdoor.len(), "filtered simple paths");
    Ok(backdoor)
}
