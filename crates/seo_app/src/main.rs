mod cli;
mod commands;
mod platform;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    platform::logging::initialize(cli.log_destination(), cli.log_level());
    commands::run(cli)
}
