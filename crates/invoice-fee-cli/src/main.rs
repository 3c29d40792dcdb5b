mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::calculate::{CalculateArgs, NewEngagementArgs, TerminatedArgs};
use commands::engagement::EngagementArgs;

/// Invoice fee calculations for advisory engagements
#[derive(Parser)]
#[command(
    name = "invoice-fee",
    version,
    about = "Invoice fee, proration and termination credit calculations",
    long_about = "Computes annual fees from tiered or bracketed fee schedules, splits them \
                  into invoice-period fees, prorates new engagements, credits terminated \
                  ones and recognizes milestone-gated project fees, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Fee policy file (YAML or JSON); defaults to the house policy
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Log engine decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Annual and invoice fee for a product
    Calculate(CalculateArgs),
    /// Invoice fee prorated for an engagement starting mid-quarter
    NewEngagement(NewEngagementArgs),
    /// Credit owed for an engagement terminated mid-quarter
    Terminated(TerminatedArgs),
    /// Full invoice for one engagement (runs the self-check first)
    Engagement(EngagementArgs),
    /// Run the known-answer self-check
    SelfCheck,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "invoice_fee_core=debug,invoice_fee=debug"
    } else {
        "invoice_fee_core=warn,invoice_fee=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let policy = match input::file::read_policy(cli.policy.as_deref()) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args, &policy),
        Commands::NewEngagement(args) => commands::calculate::run_new_engagement(args, &policy),
        Commands::Terminated(args) => commands::calculate::run_terminated(args, &policy),
        Commands::Engagement(args) => commands::engagement::run_engagement(args, &policy),
        Commands::SelfCheck => commands::self_check::run_self_check(&policy),
        Commands::Version => {
            println!("invoice-fee {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
