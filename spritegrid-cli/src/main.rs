//! Spritegrid CLI - Command-line interface
//!
//! Splits spritesheets into sprites and joins sprites into spritesheets.

mod commands;
mod error;
mod logging;
mod prompt;

use clap::{ArgAction, Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::convert::{ConvertArgs, JoinArgs, SplitArgs};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "spritegrid")]
#[command(version, about = "Split spritesheets into sprites and join sprites into spritesheets")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split a single image, or join several, depending on how many are given
    Convert(ConvertArgs),

    /// Split spritesheets into sprites
    Split(SplitArgs),

    /// Join sprites into one spritesheet
    Join(JoinArgs),

    /// View or change saved defaults
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Convert(args) => commands::convert::run_convert(args),
        Commands::Split(args) => commands::convert::run_split(args),
        Commands::Join(args) => commands::convert::run_join(args),
        Commands::Config { command } => commands::config::run(command),
    }
}
