//! Main entry point for the allure-upgrade CLI

use allure_upgrade::cli::{Cli, Commands};
use allure_upgrade::commands;
use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    // Execute command
    match cli.command {
        Commands::Patch {
            archive,
            source,
            suffix,
            json,
        } => commands::patch::execute(&archive, &source, &suffix, json),

        Commands::Info { archive } => commands::info::execute(&archive),

        Commands::Plugin { source } => commands::plugin::execute(&source),

        Commands::Diff { first, second } => commands::diff::execute(&first, &second),

        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
