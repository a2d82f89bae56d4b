//! Process entry point: logging, config resolution, and the server loop.
//! Everything that actually runs the protocol lives in `nethr-core`.

use std::path::Path;
use std::process::ExitCode;

use nethr_core::config::ConfigFile;
use nethr_core::{Config, Server, StartupError};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "nethr.json5";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn load_config_file() -> Option<ConfigFile> {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        return None;
    }
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json5::from_str(&raw) {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::warn!(error = %e, "nethr.json5 present but unparsable, using defaults");
            None
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let config = Config::resolve(load_config_file());
    let mut server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return exit_code_for(&e);
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server loop exited");
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &StartupError) -> ExitCode {
    match error {
        StartupError::Bind { .. } => ExitCode::from(1),
        StartupError::Storage(_) => ExitCode::from(2),
    }
}
