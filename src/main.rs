use anyhow::Context;
use clap::Parser;
use lmsr_markets::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use lmsr_markets::adapter::inbound::cli::output::{self, OutputConfig};
use lmsr_markets::adapter::inbound::cli::{config, quote, simulate};
use lmsr_markets::infrastructure::config::Config;
use tracing::debug;

fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = run(cli) {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    // `config validate` reports load failures itself.
    if let Commands::Config(ConfigCommand::Validate) = cli.command {
        return config::execute_validate(config_path);
    }

    let config = match config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    config.init_logging();
    debug!(fee_bps = config.engine.fee_bps, "Configuration loaded");

    match cli.command {
        Commands::Quote(args) => quote::execute(&args, config.engine.fee_bps),
        Commands::Simulate(args) => {
            simulate::execute(&args.scenario, config.engine_settings()).map(|_| ())
        }
        Commands::Config(ConfigCommand::Show) => config::execute_show(&config, config_path),
        Commands::Config(ConfigCommand::Validate) => config::execute_validate(config_path),
    }
}
