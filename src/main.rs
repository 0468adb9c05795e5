//! LurkBot - Twitch chat command bot.

use clap::Parser;
use std::process::ExitCode;

use lurkbot::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Commands::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _guard = match lurkbot::logging::init(args.log_dir.as_deref()) {
        Ok((guard, _)) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
