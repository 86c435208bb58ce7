use std::process::ExitCode;

use pegnetd::api::client::get_sync_status;
use pegnetd::cli::{Cli, Command};
use pegnetd::config::keys;
use pegnetd::lifecycle::startup::default_search_paths;
use pegnetd::lifecycle::{
    bootstrap, read_config_or_defaults, signals, Daemon, Flags, PegnetdFactory,
};
use pegnetd::observability::logging::{init_tracing, LogThreshold};

#[tokio::main]
async fn main() -> ExitCode {
    let threshold = init_tracing();
    let (cli, flags) = Cli::parse_with_flags();

    match cli.command {
        None => run_daemon(&flags, threshold).await,
        Some(Command::Status) => status(&flags, &threshold).await,
    }
}

async fn run_daemon(flags: &Flags, threshold: LogThreshold) -> ExitCode {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pegnetd starting");

    match Daemon::new(PegnetdFactory, threshold).execute(flags).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        // Already logged where it happened.
        Err(_) => ExitCode::FAILURE,
    }
}

async fn status(flags: &Flags, threshold: &LogThreshold) -> ExitCode {
    let mut boot = bootstrap(
        flags,
        &default_search_paths(),
        signals::interrupt,
        signals::exit_process,
    );
    read_config_or_defaults(&mut boot.config, threshold);
    boot.interrupt.set_grace(boot.config.get_duration(keys::SHUTDOWN_GRACE));

    let endpoint = boot.config.get_string(keys::PEGNETD);
    let status = match get_sync_status(&endpoint).await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&status) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
