//! irtify CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod dataset;

#[derive(Parser)]
#[command(name = "irtify", version, about = "Item analysis, proxy IRT parameters, and DIF for test data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print each examinee's raw score
    Scores {
        /// Path to a .toml or .json data set
        #[arg(long)]
        dataset: PathBuf,

        /// Also print the 0/1 correctness matrix
        #[arg(long)]
        matrix: bool,
    },

    /// Classical Test Theory item statistics
    Ctt {
        /// Path to a .toml or .json data set
        #[arg(long)]
        dataset: PathBuf,

        /// Also print per-item option distributions
        #[arg(long)]
        options: bool,
    },

    /// Proxy 3PL item parameters
    Irt {
        /// Path to a .toml or .json data set
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Differential Item Functioning between two examinee groups
    Dif {
        /// Path to a .toml or .json data set
        #[arg(long)]
        dataset: PathBuf,

        /// Flag items with p below this level (default from config)
        #[arg(long)]
        significance_level: Option<f64>,

        /// Group label to treat as group 1
        #[arg(long)]
        reference: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate the item characteristic curve
    Icc {
        /// Discrimination
        #[arg(long, allow_hyphen_values = true)]
        a: f64,

        /// Difficulty
        #[arg(long, allow_hyphen_values = true)]
        b: f64,

        /// Guessing
        #[arg(long, default_value = "0.0")]
        c: f64,

        /// Ability; the whole curve is sampled when omitted
        #[arg(long, allow_hyphen_values = true)]
        theta: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the full analysis and write reports
    Report {
        /// Path to a data set file or directory
        #[arg(long)]
        dataset: PathBuf,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate data set files
    Validate {
        /// Path to a data set file or directory
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Create starter config and example data set
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("irtify=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scores { dataset, matrix } => commands::scores::execute(dataset, matrix),
        Commands::Ctt { dataset, options } => commands::ctt::execute(dataset, options),
        Commands::Irt { dataset } => commands::irt::execute(dataset),
        Commands::Dif {
            dataset,
            significance_level,
            reference,
            config,
        } => commands::dif::execute(dataset, significance_level, reference, config),
        Commands::Icc {
            a,
            b,
            c,
            theta,
            config,
        } => commands::icc::execute(a, b, c, theta, config),
        Commands::Report {
            dataset,
            output,
            format,
            config,
        } => commands::report::execute(dataset, output, format, config),
        Commands::Validate { dataset } => commands::validate::execute(dataset),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
