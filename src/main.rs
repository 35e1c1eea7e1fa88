use tracing::{error, info};

use scrollchat::server::ChatServer;
use scrollchat::Config;

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // An explicit port argument overrides the config file.
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => {
                eprintln!("Invalid port argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    if let Err(e) = scrollchat::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        scrollchat::logging::init_console_only(&config.logging.level);
    }

    info!("scrollchat - chat server with scrollback");

    let server = match ChatServer::bind(&config.server).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind {}:{}: {}", config.server.host, config.server.port, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.serve().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
