use clap::Parser;
use delimited_import::cli::{args::Args, commands};
use delimited_import::constants::EXIT_CODE_CANCELLED;
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Ctrl+C cancels the worker, which stops at the next line boundary
        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                    shutdown_token.cancel();
                }
                Err(e) => eprintln!("Failed to install CTRL+C signal handler: {}", e),
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(_summary) => {
            // Success - the summary has already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            let cancelled = matches!(
                error.downcast_ref::<delimited_import::Error>(),
                Some(delimited_import::Error::Cancelled { .. })
            );
            process::exit(if cancelled { EXIT_CODE_CANCELLED } else { 1 });
        }
    }
}
