//! Netforge - deterministic network topology synthesis.
//!
//! This is the provisioning-tool face of the crate: it loads a network spec,
//! runs synthesis for the selected cloud, and renders the resulting plan.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use netforge::cloud::Cloud;
use netforge::spec::{NetworkSpec, Tier};
use netforge::synth::synthesize_plan;

/// Netforge - a deterministic multi-cloud network topology synthesizer.
#[derive(Parser, Debug)]
#[command(name = "netforge")]
#[command(author = "Netforge Contributors")]
#[command(version)]
#[command(about = "Synthesize cloud network topologies from a declarative spec", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a topology and print the resulting plan
    Synth(SynthArgs),

    /// Validate a network spec without synthesizing
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
struct SynthArgs {
    /// Path to the network spec (YAML)
    spec: PathBuf,

    /// Target cloud dialect
    #[arg(long, value_enum, default_value = "aws")]
    cloud: CloudArg,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    format: Format,
}

#[derive(clap::Args, Debug)]
struct ValidateArgs {
    /// Path to the network spec (YAML)
    spec: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CloudArg {
    Aws,
    Azure,
}

impl From<CloudArg> for Cloud {
    fn from(arg: CloudArg) -> Self {
        match arg {
            CloudArg::Aws => Cloud::Aws,
            CloudArg::Azure => Cloud::Azure,
        }
    }
}

/// Output format for the synthesized plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Human-readable summary
    Human,
    /// Full plan as JSON (resources, creation order, outputs)
    Json,
    /// GraphViz DOT rendering of the dependency graph
    Dot,
    /// Topology outputs only, as JSON
    Outputs,
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Synth(args) => synth(args),
        Commands::Validate(args) => validate(args),
    };

    if let Err(err) = result {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(err.exit_code());
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}

fn synth(args: &SynthArgs) -> netforge::error::Result<()> {
    let spec = NetworkSpec::from_file(&args.spec)?;
    let cloud: Cloud = args.cloud.into();
    let (topology, plan) = synthesize_plan(&spec, cloud)?;

    match args.format {
        Format::Human => {
            println!(
                "{} {} ({})",
                "Topology".green().bold(),
                topology.name.bold(),
                cloud
            );
            println!("  network: {}", topology.network_id);
            for tier in Tier::all() {
                let subnets = topology.subnet_ids(tier);
                if !subnets.is_empty() {
                    println!("  {} subnets: {}", tier, subnets.len());
                }
            }
            if !topology.nat_gateway_ids.is_empty() {
                println!(
                    "  NAT gateways: {} ({})",
                    topology.nat_gateway_ids.len(),
                    spec.nat_mode
                );
            }
            println!(
                "\n{} {} resources, {} dependency edges",
                "Plan:".green().bold(),
                plan.len(),
                plan.edge_count()
            );
            for address in plan.creation_order()? {
                println!("  + {address}");
            }
        }
        Format::Json => {
            let document = json!({
                "topology": topology,
                "outputs": topology.outputs(),
                "resources": plan.resources(),
                "creation_order": plan.creation_order()?,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Format::Dot => print!("{}", plan.to_dot()),
        Format::Outputs => println!("{}", topology.outputs().to_json()?),
    }

    Ok(())
}

fn validate(args: &ValidateArgs) -> netforge::error::Result<()> {
    let spec = NetworkSpec::from_file(&args.spec)?;
    println!(
        "{} {} ({} zones, {} subnets, nat: {})",
        "valid:".green().bold(),
        spec.name,
        spec.zones.len(),
        spec.subnet_count(),
        spec.nat_mode
    );
    Ok(())
}
