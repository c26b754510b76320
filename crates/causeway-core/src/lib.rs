#![forbid(unsafe_code)]
//! causeway-core library.
//!
//! Causal graph utilities: load GML graphs, find backdoor paths, classify
//! colliders along paths and query backdoor/frontdoor adjustment sets.
//!
//! # Conventions
//!
//! - **Errors**: Typed [`error::CausewayError`] for graph and path queries;
//!   `anyhow::Result` at the model seams so external errors pass through.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod adjust;
pub mod config;
pub mod error;
pub mod graph;
pub mod identify;

pub use adjust::{AdjustmentRecord, AdjustmentTable, adjustment_variables};
pub use error::{CausewayError, ErrorCode};
pub use graph::{CausalGraph, find_backdoor_paths, load_graph_text};
pub use identify::{CausalModel, Identifier, backdoor_sets, frontdoor_sets};
