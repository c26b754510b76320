//! `cw identify`: backdoor adjustment sets and frontdoor variables from the
//! built-in graph identifier.

use std::io::Write;
use std::path::PathBuf;

use causeway_core::config::IdentifyConfig;
use causeway_core::identify::{
    AdjustmentSet, Estimand, GraphModel, backdoor_sets, frontdoor_sets,
};
use clap::Args;
use serde::Serialize;
use tracing::warn;

use super::open_graph;
use crate::output::{OutputMode, join_or_dash, pretty_kv, pretty_section, render_mode};

/// Arguments for `cw identify`.
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// GML graph file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Treatment variable(s), comma-separated or repeated.
    #[arg(long, short = 't', value_name = "NODE", value_delimiter = ',', required = true)]
    pub treatment: Vec<String>,

    /// Outcome variable(s), comma-separated or repeated.
    #[arg(long, short = 'y', value_name = "NODE", value_delimiter = ',', required = true)]
    pub outcome: Vec<String>,

    /// Only search for backdoor adjustment sets.
    #[arg(long, conflicts_with = "frontdoor_only")]
    pub backdoor_only: bool,

    /// Only search for a frontdoor variable.
    #[arg(long)]
    pub frontdoor_only: bool,
}

#[derive(Debug, Serialize)]
struct IdentifyOutput {
    estimand: Option<Estimand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backdoor_sets: Option<Vec<AdjustmentSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frontdoor_variables: Option<Vec<String>>,
}

/// Execute `cw identify`.
pub fn run_identify(
    args: &IdentifyArgs,
    config: IdentifyConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = open_graph(&args.file)?;
    let mut model = GraphModel::new(graph, args.treatment.clone(), args.outcome.clone(), config);

    let backdoor = if args.frontdoor_only {
        None
    } else {
        Some(backdoor_sets(&mut model)?)
    };

    let single_query = args.treatment.len() == 1 && args.outcome.len() == 1;
    let frontdoor = if args.backdoor_only {
        None
    } else if !single_query && !args.frontdoor_only {
        warn!("skipping frontdoor search: it needs exactly one treatment and one outcome");
        None
    } else {
        Some(frontdoor_sets(&mut model)?)
    };

    let payload = IdentifyOutput {
        estimand: model.estimand().cloned(),
        backdoor_sets: backdoor,
        frontdoor_variables: frontdoor,
    };
    render_mode(output, &payload, render_identify_text, render_identify_pretty)
}

fn render_identify_text(payload: &IdentifyOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if let Some(sets) = &payload.backdoor_sets {
        for set in sets {
            writeln!(w, "backdoor\t{}", set.variables.join(","))?;
        }
    }
    if let Some(vars) = &payload.frontdoor_variables {
        for var in vars {
            writeln!(w, "frontdoor\t{var}")?;
        }
    }
    Ok(())
}

fn render_identify_pretty(payload: &IdentifyOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Identification")?;
    if let Some(estimand) = &payload.estimand {
        pretty_kv(w, "treatment", estimand.treatment.join(", "))?;
        pretty_kv(w, "outcome", estimand.outcome.join(", "))?;
        pretty_kv(w, "backdoor paths", estimand.backdoor_paths.to_string())?;
        pretty_kv(
            w,
            "directed path",
            if estimand.has_directed_path { "yes" } else { "no" },
        )?;
    }

    if let Some(sets) = &payload.backdoor_sets {
        writeln!(w)?;
        pretty_section(w, "Backdoor adjustment sets")?;
        if sets.is_empty() {
            writeln!(w, "None found within the configured search limits.")?;
        }
        for set in sets {
            let shown = if set.variables.is_empty() {
                "{} (no adjustment needed)".to_string()
            } else {
                format!("{{{}}}", join_or_dash(&set.variables, ", "))
            };
            writeln!(w, "  {shown}")?;
        }
    }

    if let Some(vars) = &payload.frontdoor_variables {
        writeln!(w)?;
        pretty_section(w, "Frontdoor variables")?;
        if vars.is_empty() {
            writeln!(w, "None found.")?;
        }
        for var in vars {
            writeln!(w, "  {var}")?;
        }
    }
    Ok(())
}
