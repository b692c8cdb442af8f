use attend::commands::Cli;
use attend::libs::messages::macros::is_debug_mode;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    if is_debug_mode() {
        init_tracing();
    }

    match Cli::menu().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            // Repository errors already carry the ❌ prefix.
            let text = format!("{:#}", e);
            if text.starts_with('❌') {
                eprintln!("{}", text);
            } else {
                eprintln!("❌ {}", text);
            }
            ExitCode::FAILURE
        }
    }
}

/// Structured console logs, filtered by `RUST_LOG` (default `attend=debug`).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,attend=debug")))
        .init();
}
