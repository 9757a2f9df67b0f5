use clap::Parser;
use sheets_wizard::{CliArgs, LoggingConfig, ServerConfig, TransportKind, init_logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config = ServerConfig::from_args(cli)?;

    let mut logging_config = LoggingConfig::from_env();
    if config.transport == TransportKind::Stdio {
        logging_config = logging_config.for_stdio_transport();
    }
    let _guard = init_logging(logging_config)?;

    // fail fast before any transport is opened
    config.validate()?;

    run_server(config).await
}
