//! Pitline CLI entry point.

use clap::Parser;

use pitline::cli::{commands, handle_error, Cli, Commands};
use pitline::infrastructure::config::ConfigLoader;
use pitline::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;
    let log_config = LogConfig::try_from(&config.logging).map_err(anyhow::Error::msg)?;
    let _logger = LoggerImpl::init(&log_config)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, &config).await,
        Commands::Migrate => commands::migrate::execute(&config, cli.json).await,
        Commands::Seed => commands::seed::execute(&config, cli.json).await,
        Commands::Import(args) => commands::import::execute(args, &config, cli.json).await,
        Commands::Races(args) => commands::races::execute(args, &config, cli.json).await,
    }
}
