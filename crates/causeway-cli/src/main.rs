#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process::ExitCode;

use causeway_core::config::{EffectiveConfig, resolve_config};
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "causeway: backdoor paths, colliders and adjustment sets for causal DAGs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT and the user config).
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment and user config.
    fn output_mode(&self, config: &EffectiveConfig) -> OutputMode {
        resolve_output_mode(self.format, self.json, config.user.output.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graphs",
        about = "Load a graph file as one line",
        long_about = "Read a graph file, strip trailing whitespace from every line and join the lines without separators.",
        after_help = "EXAMPLES:\n    # Print a GML file as a single line\n    cw load model.gml\n\n    # Emit machine-readable output\n    cw load model.gml --json"
    )]
    Load(cmd::load::LoadArgs),

    #[command(
        next_help_heading = "Paths",
        about = "List backdoor paths between two nodes",
        long_about = "List the simple paths between two nodes, ignoring edge direction, whose first edge points into the source.",
        after_help = "EXAMPLES:\n    # Backdoor paths from treatment to outcome\n    cw paths model.gml --from Smoking --to Cancer\n\n    # Every simple path, at most three intermediate nodes\n    cw paths model.gml --from Smoking --to Cancer --all --max-nodes 3\n\n    # Emit machine-readable output\n    cw paths model.gml --from Smoking --to Cancer --json"
    )]
    Paths(cmd::paths::PathsArgs),

    #[command(
        next_help_heading = "Paths",
        about = "Classify colliders along backdoor paths",
        long_about = "For every backdoor path, list the colliders with their descendants and the remaining interior non-colliders.",
        after_help = "EXAMPLES:\n    # Adjustment table for one treatment/outcome pair\n    cw adjust model.gml --from Smoking --to Cancer\n\n    # Tab-separated output for scripts\n    cw adjust model.gml --from Smoking --to Cancer --format text"
    )]
    Adjust(cmd::adjust::AdjustArgs),

    #[command(
        next_help_heading = "Identification",
        about = "Find backdoor and frontdoor adjustment sets",
        long_about = "Identify the causal effect and list minimal backdoor adjustment sets and frontdoor variables.",
        after_help = "EXAMPLES:\n    # Both criteria\n    cw identify model.gml --treatment Smoking --outcome Cancer\n\n    # Backdoor sets for a treatment set\n    cw identify model.gml -t A,B -y Y --backdoor-only\n\n    # Emit machine-readable output\n    cw identify model.gml -t Smoking -y Cancer --json"
    )]
    Identify(cmd::identify::IdentifyArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    cw completions bash\n\n    # Generate zsh completions\n    cw completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CAUSEWAY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "causeway=debug,info"
        } else {
            "causeway=info,warn"
        })
    });

    let format = env::var("CAUSEWAY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, config: &EffectiveConfig, output: OutputMode) -> anyhow::Result<()> {
    match cli.command {
        Commands::Load(args) => cmd::load::run_load(&args, output),
        Commands::Paths(args) => cmd::paths::run_paths(&args, &config.project, output),
        Commands::Adjust(args) => cmd::adjust::run_adjust(&args, &config.project, output),
        Commands::Identify(args) => {
            cmd::identify::run_identify(&args, config.project.identify, output)
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Config errors are reported before the output mode is known.
    let early_mode = resolve_output_mode(cli.format, cli.json, None);
    let config = match env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|root| resolve_config(&root))
    {
        Ok(config) => config,
        Err(err) => return fail(early_mode, &err),
    };

    let output = cli.output_mode(&config);
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?output, json = output.is_json(), "resolved output mode");

    match run(cli, &config, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(output, &err),
    }
}

fn fail(output: OutputMode, err: &anyhow::Error) -> ExitCode {
    if render_error(output, &CliError::from_anyhow(err)).is_err() {
        eprintln!("error: {err:#}");
    }
    ExitCode::FAILURE
}
