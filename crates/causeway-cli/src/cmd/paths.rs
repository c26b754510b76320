//! `cw paths`: list backdoor paths (or every simple path) between two nodes.

use std::io::Write;
use std::path::PathBuf;

use causeway_core::config::ProjectConfig;
use causeway_core::graph::{IncomingEdgeBackdoor, all_simple_paths_between, find_backdoor_paths_bounded};
use clap::Args;
use serde::Serialize;

use super::open_graph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `cw paths`.
#[derive(Args, Debug)]
pub struct PathsArgs {
    /// GML graph file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Source node (usually the treatment).
    #[arg(long = "from", value_name = "NODE")]
    pub source: String,

    /// Target node (usually the outcome).
    #[arg(long = "to", value_name = "NODE")]
    pub target: String,

    /// List every simple path instead of only backdoor paths.
    #[arg(long)]
    pub all: bool,

    /// Maximum number of intermediate nodes per path (overrides config).
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PathsOutput {
    source: String,
    target: String,
    kind: &'static str,
    paths: Vec<Vec<String>>,
}

/// Execute `cw paths`.
pub fn run_paths(args: &PathsArgs, config: &ProjectConfig, output: OutputMode) -> anyhow::Result<()> {
    let graph = open_graph(&args.file)?;
    let limit = args.max_nodes.or(config.paths.max_intermediate_nodes);

    let (kind, paths) = if args.all {
        (
            "all",
            all_simple_paths_between(&graph, &args.source, &args.target, limit)?,
        )
    } else {
        (
            "backdoor",
            find_backdoor_paths_bounded(
                &graph,
                &args.source,
                &args.target,
                &IncomingEdgeBackdoor,
                limit,
            )?,
        )
    };

    let payload = PathsOutput {
        source: args.source.clone(),
        target: args.target.clone(),
        kind,
        paths,
    };
    render_mode(output, &payload, render_paths_text, render_paths_pretty)
}

fn render_paths_text(payload: &PathsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for path in &payload.paths {
        writeln!(w, "{}", path.join(" "))?;
    }
    Ok(())
}

fn render_paths_pretty(payload: &PathsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let heading = if payload.kind == "all" {
        "Simple paths"
    } else {
        "Backdoor paths"
    };
    pretty_section(w, heading)?;
    pretty_kv(w, "from", &payload.source)?;
    pretty_kv(w, "to", &payload.target)?;
    pretty_kv(w, "count", payload.paths.len().to_string())?;

    if payload.paths.is_empty() {
        writeln!(w, "\nNo paths found.")?;
        return Ok(());
    }
    writeln!(w)?;
    for (idx, path) in payload.paths.iter().enumerate() {
        writeln!(w, "{:>3}. {}", idx + 1, path.join(" - "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: PathsArgs,
    }

    fn sample() -> PathsOutput {
        PathsOutput {
            source: "T".into(),
            target: "Y".into(),
            kind: "backdoor",
            paths: vec![vec!["T".into(), "Z".into(), "Y".into()]],
        }
    }

    #[test]
    fn paths_args_parse() {
        let parsed = Wrapper::parse_from(["test", "g.gml", "--from", "T", "--to", "Y", "--all"]);
        assert_eq!(parsed.args.source, "T");
        assert_eq!(parsed.args.target, "Y");
        assert!(parsed.args.all);
        assert!(parsed.args.max_nodes.is_none());
    }

    #[test]
    fn paths_args_require_endpoints() {
        assert!(Wrapper::try_parse_from(["test", "g.gml", "--from", "T"]).is_err());
    }

    #[test]
    fn text_render_is_one_path_per_line() {
        let mut out = Vec::new();
        render_paths_text(&sample(), &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "T Z Y\n");
    }

    #[test]
    fn pretty_render_numbers_paths() {
        let mut out = Vec::new();
        render_paths_pretty(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.starts_with("Backdoor paths\n"));
        assert!(rendered.contains("  1. T - Z - Y"));
    }

    #[test]
    fn pretty_render_empty() {
        let mut payload = sample();
        payload.paths.clear();
        let mut out = Vec::new();
        render_paths_pretty(&payload, &mut out).expect("render");
        assert!(String::from_utf8(out).expect("utf8").contains("No paths found."));
    }
}
