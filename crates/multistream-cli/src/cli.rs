use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    LayoutArgs, ResetArgs, SignatureArgs, SizeArgs, ValidateArgs, load_config, run_layout,
    run_reset, run_signature, run_size, run_validate,
};
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "multistream-layout",
    about = "Tile sizing, placement and validation for multistream grids",
    version
)]
pub struct Cli {
    /// Layout configuration file (.toml or .json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the fitted tile size for a container.
    Size(SizeArgs),

    /// Print every tile's rectangle for a set of streams.
    Layout(LayoutArgs),

    /// Check a resize or drag of one tile; exits 3 when rejected.
    Validate(ValidateArgs),

    /// Forget the saved customizations for a set of streams.
    Reset(ResetArgs),

    /// Print the stream-set signature and its storage key.
    Signature(SignatureArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(cli, &mut out)
}

pub fn run_to<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Size(args) => run_size(&config, args, out),
        Commands::Layout(args) => run_layout(config, args, out),
        Commands::Validate(args) => run_validate(config, args, out),
        Commands::Reset(args) => run_reset(&config, args, out),
        Commands::Signature(args) => run_signature(&config, args, out),
    }
}
