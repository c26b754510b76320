pub mod adjust;
pub mod completions;
pub mod identify;
pub mod load;
pub mod paths;

use std::path::Path;

use causeway_core::CausalGraph;
use causeway_core::graph::load_gml;
use tracing::debug;

/// Load and parse the GML graph named on the command line.
pub fn open_graph(path: &Path) -> anyhow::Result<CausalGraph> {
    let graph = load_gml(path)?;
    debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "opened graph"
    );
    Ok(graph)
}
