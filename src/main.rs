mod agents;
mod cli;
mod error;
mod maven;
mod utils;
mod workflow;

use agents::CliOverrides;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var("POMVER_VERBOSE", "1");
        }
    }

    let result = match cli.command {
        Commands::UseExactVersion {
            exact_version,
            includes,
            excludes,
            no_dependency_management,
            no_dependencies,
            include_reactor,
            non_recursive,
            no_backup,
            commit,
        } => workflow::execute_use_exact_version(
            &cli.path,
            &exact_version,
            CliOverrides {
                includes,
                excludes,
                no_dependency_management,
                no_dependencies,
                include_reactor,
                no_backup,
            },
            non_recursive,
            commit,
        ),
        Commands::List {
            json,
            includes,
            excludes,
        } => workflow::execute_list(
            &cli.path,
            json,
            CliOverrides {
                includes,
                excludes,
                ..CliOverrides::default()
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
