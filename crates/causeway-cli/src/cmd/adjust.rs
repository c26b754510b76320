//! `cw adjust`: collider/non-collider table over the backdoor paths between
//! two nodes.

use std::io::Write;
use std::path::PathBuf;

use causeway_core::adjust::{AdjustmentTable, COLUMNS, adjustment_variables};
use causeway_core::config::ProjectConfig;
use causeway_core::graph::{IncomingEdgeBackdoor, find_backdoor_paths_bounded};
use clap::Args;
use serde::Serialize;

use super::open_graph;
use crate::output::{OutputMode, join_or_dash, pretty_kv, pretty_section, render_mode};

/// Arguments for `cw adjust`.
#[derive(Args, Debug)]
pub struct AdjustArgs {
    /// GML graph file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Source node (usually the treatment).
    #[arg(long = "from", value_name = "NODE")]
    pub source: String,

    /// Target node (usually the outcome).
    #[arg(long = "to", value_name = "NODE")]
    pub target: String,

    /// Maximum number of intermediate nodes per path (overrides config).
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,
}

#[derive(Debug, Serialize)]
struct AdjustOutput {
    source: String,
    target: String,
    #[serde(flatten)]
    table: AdjustmentTable,
}

/// Execute `cw adjust`.
pub fn run_adjust(
    args: &AdjustArgs,
    config: &ProjectConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = open_graph(&args.file)?;
    let limit = args.max_nodes.or(config.paths.max_intermediate_nodes);
    let paths = find_backdoor_paths_bounded(
        &graph,
        &args.source,
        &args.target,
        &IncomingEdgeBackdoor,
        limit,
    )?;

    let payload = AdjustOutput {
        source: args.source.clone(),
        target: args.target.clone(),
        table: adjustment_variables(&graph, &paths),
    };
    render_mode(output, &payload, render_adjust_text, render_adjust_pretty)
}

/// Tab-separated rows under a header; list cells are comma-joined.
fn render_adjust_text(payload: &AdjustOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", COLUMNS.join("\t"))?;
    for row in &payload.table {
        writeln!(
            w,
            "{}\t{}\t{}",
            row.path.join(","),
            row.colliders_desc.join(","),
            row.non_colliders.join(",")
        )?;
    }
    Ok(())
}

fn render_adjust_pretty(payload: &AdjustOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Adjustment variables")?;
    pretty_kv(w, "from", &payload.source)?;
    pretty_kv(w, "to", &payload.target)?;
    pretty_kv(w, "backdoor paths", payload.table.len().to_string())?;

    if payload.table.is_empty() {
        writeln!(w, "\nNo backdoor paths found.")?;
        return Ok(());
    }
    for (idx, row) in payload.table.iter().enumerate() {
        writeln!(w, "\nPath {}:", idx + 1)?;
        pretty_kv(w, "  path", row.path.join(" - "))?;
        pretty_kv(w, "  colliders", join_or_dash(&row.colliders_desc, ", "))?;
        pretty_kv(w, "  non-colliders", join_or_dash(&row.non_colliders, ", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use causeway_core::CausalGraph;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AdjustArgs,
    }

    fn sample() -> AdjustOutput {
        let graph = CausalGraph::from_edges(&[("A", "T"), ("A", "C"), ("B", "C"), ("B", "Y"), ("T", "Y")]);
        let paths = vec![vec![
            "T".to_string(),
            "A".to_string(),
            "C".to_string(),
            "B".to_string(),
            "Y".to_string(),
        ]];
        AdjustOutput {
            source: "T".into(),
            target: "Y".into(),
            table: adjustment_variables(&graph, &paths),
        }
    }

    #[test]
    fn adjust_args_parse() {
        let parsed = Wrapper::parse_from(["test", "g.gml", "--from", "T", "--to", "Y", "--max-nodes", "3"]);
        assert_eq!(parsed.args.file, PathBuf::from("g.gml"));
        assert_eq!(parsed.args.max_nodes, Some(3));
    }

    #[test]
    fn text_render_is_tab_separated() {
        let mut out = Vec::new();
        render_adjust_text(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["path\tcolliders_desc\tnon_colliders", "T,A,C,B,Y\tC\tA,B"]);
    }

    #[test]
    fn pretty_render_lists_each_path() {
        let mut out = Vec::new();
        render_adjust_pretty(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("Path 1:"));
        assert!(rendered.contains("T - A - C - B - Y"));
        assert!(rendered.contains("  non-colliders: A, B"));
    }

    #[test]
    fn json_shape_has_rows() {
        let value = serde_json::to_value(sample()).expect("json");
        assert_eq!(value["source"], "T");
        assert_eq!(value["rows"][0]["colliders_desc"], serde_json::json!(["C"]));
        assert_eq!(value["rows"][0]["non_colliders"], serde_json::json!(["A", "B"]));
    }
}
