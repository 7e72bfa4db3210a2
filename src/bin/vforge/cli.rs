use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vforge",
    about = "Virtual-site geometry resolution and placement",
    version,
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute all particle positions, virtual sites included
    #[command(visible_alias = "p")]
    Positions(PositionsArgs),

    /// Print each site's weight expression over its orientation atoms
    #[command(visible_alias = "w")]
    Weights(WeightsArgs),
}

/// System description shared by all commands.
#[derive(Args)]
pub struct SystemOptions {
    /// System description (topology + parameter collections, TOML)
    #[arg(short, long, value_name = "FILE")]
    pub system: PathBuf,
}

#[derive(Args)]
pub struct PositionsArgs {
    #[command(flatten)]
    pub system: SystemOptions,

    /// Real-atom coordinates, XYZ (stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output XYZ (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write zero vectors for virtual-site rows instead of placing them
    #[arg(long)]
    pub zeros: bool,
}

#[derive(Args)]
pub struct WeightsArgs {
    #[command(flatten)]
    pub system: SystemOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}
