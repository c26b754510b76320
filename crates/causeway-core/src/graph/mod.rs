//! Causal graph module.
//!
//! # Overview
//!
//! Loads graph files, builds a petgraph-backed directed causal graph and
//! enumerates the paths that the adjustment and identification layers work
//! on.
//!
//! ## Pipeline
//!
//! ```text
//! .gml file
//!        ↓  gml::load_graph_text()      (or gml::load_gml() for both steps)
//! single-line GML string
//!        ↓  gml::parse_gml()
//! CausalGraph (DiGraph<String, ()> + name map)
//!        ↓  paths::find_backdoor_paths()
//! Vec<path> (simple paths in the undirected projection, filtered)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use causeway_core::graph::{gml, paths::{find_backdoor_paths, IncomingEdgeBackdoor}};
//!
//! let text = gml::load_graph_text(Path::new("model.gml"))?;
//! let graph = gml::parse_gml(&text)?;
//! let paths = find_backdoor_paths(&graph, "T", "Y", &IncomingEdgeBackdoor)?;
//! ```

pub mod build;
pub mod gml;
pub mod paths;

// Re-export primary types at module level for convenience.
pub use build::CausalGraph;
pub use gml::{load_gml, load_graph_text, parse_gml};
pub use paths::{
    BackdoorTest, IncomingEdgeBackdoor, all_simple_paths_between, find_backdoor_paths,
    find_backdoor_paths_bounded,
};
