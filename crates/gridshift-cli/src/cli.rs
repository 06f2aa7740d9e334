use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use gridshift_algo::FailurePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Graph utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Relocate random non-critical buses while keeping the feeder connected
    Mutate(MutateArgs),
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Graph stats summary
    Stats {
        /// Topology JSON file or a builtin case name (case33bw, case33bw-meshed)
        #[arg(value_hint = ValueHint::FilePath)]
        grid: String,
    },
    /// Find islands in the grid
    Islands {
        /// Topology JSON file or a builtin case name
        #[arg(value_hint = ValueHint::FilePath)]
        grid: String,
        /// Also print a per-bus island table
        #[arg(long)]
        emit: bool,
    },
    /// Export the topology as Graphviz DOT
    Export {
        /// Topology JSON file or a builtin case name
        #[arg(value_hint = ValueHint::FilePath)]
        grid: String,
        /// Output format (e.g., graphviz)
        #[arg(long, default_value = "graphviz")]
        format: String,
        /// Optional output file path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List buses whose removal would split the grid
    Critical {
        /// Topology JSON file or a builtin case name
        #[arg(value_hint = ValueHint::FilePath)]
        grid: String,
        /// Detection method
        #[arg(long, value_enum, default_value_t = DetectorKind::Articulation)]
        detector: DetectorKind,
    },
}

#[derive(clap::Args, Debug)]
pub struct MutateArgs {
    /// Topology JSON file or a builtin case name (case33bw, case33bw-meshed)
    #[arg(value_hint = ValueHint::FilePath)]
    pub grid: String,

    /// TOML file with a [mutation] table; flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Number of buses to move
    #[arg(short = 'k', long)]
    pub count: Option<usize>,

    /// Reconnection attempts per bus
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Candidate lines tried per attempt
    #[arg(long)]
    pub candidates: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// What to do with the batch when a bus cannot be reconnected
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Critical bus detection method
    #[arg(long, value_enum, default_value_t = DetectorKind::Articulation)]
    pub detector: DetectorKind,

    /// Write the mutated topology (JSON) here
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write the mutated topology as Graphviz DOT here
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Write the batch report (JSON) here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit with an error if any bus was rolled back
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorKind {
    /// Linear-time articulation point sweep (default)
    #[default]
    Articulation,
    /// Remove each bus and re-check connectivity
    Removal,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Roll back the failed bus and keep going
    Continue,
    /// Roll back the failed bus and stop, keeping earlier moves
    Stop,
    /// Stop and undo every move of the batch
    RevertBatch,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Continue => FailurePolicy::Continue,
            PolicyArg::Stop => FailurePolicy::Stop,
            PolicyArg::RevertBatch => FailurePolicy::RevertBatch,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
