use std::io::BufRead;

use tracing::info;

use palisade::{Config, WebServer};

/// Read a password from stdin and print its Argon2id hash.
fn hash_password_mode() -> std::process::ExitCode {
    eprint!("Password: ");
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        eprintln!("Failed to read password from stdin");
        return std::process::ExitCode::FAILURE;
    }
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        eprintln!("Password must not be empty");
        return std::process::ExitCode::FAILURE;
    }

    match palisade::hash_password(password) {
        Ok(hash) => {
            println!("{hash}");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to hash password: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if std::env::args().nth(1).as_deref() == Some("hash-password") {
        return hash_password_mode();
    }

    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = palisade::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        palisade::logging::init_console_only(&config.logging.level);
    }

    // Fail closed on configuration faults
    if let Err(e) = config.validate() {
        eprintln!("Refusing to start: {e}");
        return std::process::ExitCode::FAILURE;
    }

    info!("Palisade - admin authentication service");

    let server = match WebServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Refusing to start: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}
