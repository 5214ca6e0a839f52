use clap::Parser;

use warden::cli::{self, Cli};
use warden::logger::init_logger;
use warden::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if cli.is_dry_run() {
        if let Err(e) = cli::dry_run_report(&settings) {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)?;

    Server::new(settings).run().await
}
