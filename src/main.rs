//! pkgrecipe CLI - Declarative package-build recipes
//!
//! Entry point for the pkgrecipe command-line application.

use anyhow::Result;
use clap::Parser;

use pkgrecipe::cli::output::display_error;
use pkgrecipe::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output_config = cli.output_config();

    // Initialize tracing subscriber; RUST_LOG directives still apply
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(output_config.log_level().into()),
        )
        .init();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
