use clap::Parser;
use env_logger::Env;

use carmap::cli::{Cli, Command};
use carmap::commands;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Map {
            from_brand,
            restart,
            no_ai,
        } => commands::map::run(&cli.source, &cli.target, &cli.progress, from_brand, restart, no_ai)?,
        Command::Undo => commands::undo::run(&cli.source, &cli.progress)?,
        Command::Stats { brand } => commands::stats::run(&cli.source, brand.as_deref())?,
        Command::Index { out } => commands::index::run(&cli.source, &out)?,
    }

    Ok(())
}
