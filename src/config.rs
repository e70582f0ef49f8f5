use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
pub struct Main {
    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Generate a Swift client library from a discovery document.
    Library(GenerateArgs),
    /// Generate a Swift command-line tool from a discovery document.
    Cli(GenerateArgs),
}

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// The path to the discovery document (`.json`).
    pub input: PathBuf,

    /// The output directory for the generated file.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}
