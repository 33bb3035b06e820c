use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use docstore_cli::cli::Cli;
use docstore_cli::{commands, Dependencies, Settings};
use docstore_repository::RequestContext;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let settings = Settings::from(cli.connection);
    let deps = match Dependencies::new(&settings) {
        Ok(deps) => deps,
        Err(e) => {
            error!(kind = e.kind(), "Failed to initialize dependencies: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let token = CancellationToken::new();
    let mut ctx = RequestContext::with_token(token.clone());
    if let Some(timeout) = settings.timeout() {
        ctx = ctx.with_timeout(timeout);
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling in-flight request");
            token.cancel();
        }
    });

    match commands::run(cli.command, &deps, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = e.kind(), "Command failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
