use clap::Parser;
use discogen::codegen::{CliUnit, LibraryUnit, write_to_disk};
use discogen::parse::{Resource, Service};
use indexmap::IndexMap;
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

mod config;

use self::config::{Command, GenerateArgs, Main};

fn main() -> Result<()> {
    let main = Main::parse();
    init_logging(main.verbose);

    match main.command {
        Command::Library(args) => {
            let service = load_service(&args)?;
            println!(
                "Generating {} schema declarations...",
                service.schemas.len()
            );
            write_to_disk(&args.output, LibraryUnit::new(&service))?;
        }
        Command::Cli(args) => {
            let service = load_service(&args)?;
            println!(
                "Generating {} subcommands across {} resources...",
                method_count(&service.resources),
                resource_count(&service.resources),
            );
            write_to_disk(&args.output, CliUnit::new(&service))?;
        }
    }

    println!("Generation complete");

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_service(args: &GenerateArgs) -> Result<Service> {
    let source = std::fs::read_to_string(&args.input)
        .into_diagnostic()
        .with_context(|| format!("Failed to read `{}`", args.input.display()))?;

    let service = Service::from_json(&source)
        .into_diagnostic()
        .context("Failed to parse discovery document")?;

    match &service.version {
        Some(version) => println!("Service: {} {} ({})", service.name, version, service.base_url),
        None => println!("Service: {} ({})", service.name, service.base_url),
    }

    Ok(service)
}

fn method_count(resources: &IndexMap<String, Resource>) -> usize {
    resources
        .values()
        .map(|resource| resource.methods.len() + method_count(&resource.resources))
        .sum()
}

fn resource_count(resources: &IndexMap<String, Resource>) -> usize {
    resources
        .values()
        .map(|resource| 1 + resource_count(&resource.resources))
        .sum()
}
