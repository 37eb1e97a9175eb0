use sede_gateway::logger::{self, LoggerConfig};
use sede_gateway::{server, AppState, Config, GenerationClient, LeonardoClient, SessionStore};
use std::process::ExitCode;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init_with_config(LoggerConfig::from_config(&config)) {
        eprintln!("ERROR: {}", e);
        return ExitCode::FAILURE;
    }
    if !dotenv_loaded {
        log::warn!("No .env file found, using process environment only");
    }

    let provider = match LeonardoClient::new(config.leonardo.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Failed to initialize Leonardo client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let generator =
        GenerationClient::new(provider, config.generation.clone(), config.polling);
    let store = Arc::new(SessionStore::new(config.initial_quota));
    let state = AppState::new(&config, store, generator);

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &config);

    match server::run(&config, state).await {
        Ok(()) => {
            log::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
