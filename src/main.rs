//! comfypack - ComfyUI workflow packager
//!
//! Reads a ComfyUI workflow, resolves the models and custom node packages it
//! references in a local installation, and assembles a portable package.
//! Models left out of a package are restored later with `comfypack fetch`.

use clap::Parser;

mod assembler;
mod cli;
mod commands;
mod common;
mod config;
mod detect;
mod domain;
mod error;
mod fetcher;
mod hash;
mod logging;
mod paths;
mod progress;
mod registry;
mod resolver;
mod scanner;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Pack(args) => commands::pack::run(args),
        Commands::Fetch(args) => commands::fetch::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
