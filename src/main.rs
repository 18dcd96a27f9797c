use std::process::ExitCode;

use authgate::config::{load_config, print_schema};
use authgate::startup::run;
use authgate::utils::logger::init_logging;
use tracing::error;

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| arg == "--print-schema") {
        print_schema();
        return ExitCode::SUCCESS;
    }

    let config_path =
        std::env::var("AUTHGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from '{}': {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = run(config).await {
        error!("Server failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
