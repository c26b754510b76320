//! `cw load`: print a graph file as a single line of text.

use std::io::Write;
use std::path::PathBuf;

use causeway_core::graph::load_graph_text;
use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `cw load`.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Graph file to load.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct LoadOutput {
    path: String,
    bytes: usize,
    text: String,
}

/// Execute `cw load`.
pub fn run_load(args: &LoadArgs, output: OutputMode) -> anyhow::Result<()> {
    let text = load_graph_text(&args.file)?;
    let payload = LoadOutput {
        path: args.file.display().to_string(),
        bytes: text.len(),
        text,
    };
    render_mode(
        output,
        &payload,
        |p, w| writeln!(w, "{}", p.text),
        render_load_pretty,
    )
}

fn render_load_pretty(payload: &LoadOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Graph text")?;
    pretty_kv(w, "file", &payload.path)?;
    pretty_kv(w, "bytes", payload.bytes.to_string())?;
    writeln!(w)?;
    writeln!(w, "{}", payload.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LoadArgs,
    }

    #[test]
    fn load_args_take_positional_file() {
        let parsed = Wrapper::parse_from(["test", "graph.gml"]);
        assert_eq!(parsed.args.file, PathBuf::from("graph.gml"));
    }

    #[test]
    fn pretty_render_includes_text_and_size() {
        let payload = LoadOutput {
            path: "g.gml".into(),
            bytes: 9,
            text: "graph [ ]".into(),
        };
        let mut out = Vec::new();
        render_load_pretty(&payload, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("file:            g.gml"));
        assert!(rendered.contains("bytes:           9"));
        assert!(rendered.ends_with("graph [ ]\n"));
    }
}
