//! auth-context demo server entry point.

use std::sync::Arc;

use auth_context::api::{serve, AppState};
use auth_context::cli::{parse_args, print_help, print_version};
use auth_context::config::Config;
use auth_context::{logging, AuthContextError, AuthProvider};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> auth_context::Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        print_version();
        return Ok(());
    }

    let config = Config::load(&args).map_err(|e| AuthContextError::Config(e.to_string()))?;

    if logging::try_init_with_level(config.log_filter()).is_err() {
        warn!("Logging was already initialized");
    }

    info!("auth-context v{}", env!("CARGO_PKG_VERSION"));

    let identity = config
        .identity_service()
        .map_err(|e| AuthContextError::Config(e.to_string()))?;
    info!(
        "Identity service ready ({} seeded accounts)",
        identity.account_count()
    );

    let server_config = config
        .to_server_config()
        .map_err(|e| AuthContextError::Config(e.to_string()))?;

    let provider = AuthProvider::mount(Arc::new(identity)).await;
    let result = serve(server_config, AppState::new(provider.context())).await;

    provider.teardown();
    info!("auth-context stopped");

    result
}
