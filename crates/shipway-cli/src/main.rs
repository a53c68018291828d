//! Shipway CLI entrypoint.

use clap::Parser;

mod commands;
mod dry_run;
mod handlers;

use commands::Commands;

#[derive(Parser)]
#[command(name = "shipway")]
#[command(author, version, about = "Release orchestration pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ref_kind,
            ref_name,
            dry_run,
        } => handlers::run(&config, ref_kind, &ref_name, dry_run).await?,
        Commands::Validate { config } => handlers::validate(&config)?,
    }

    Ok(())
}
