//! sdkup CLI Application
//!
//! `use`, `current` and `export` only touch the local store and run without a
//! tokio runtime; `export` is evaluated on every new shell. Commands that talk
//! to the catalog run on a multi-threaded runtime.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use sdkup::cli::{self, Cli, CliError, Commands, EXIT_OK, OkEnvelope, exit_code_for, render_error};
use sdkup::commands::{self, Output};
use sdkup::tracing::{TracingConfig, init_tracing};

/// Main entry point - determines sync vs async execution path
fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    // Ignore error if tracing already initialized
    let _ = init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..Default::default()
    });

    let exit_code = if requires_async_runtime(&cli) {
        run_with_tokio(cli)
    } else {
        run_sync(cli)
    };
    std::process::exit(exit_code);
}

/// Determine if a command requires the async runtime
const fn requires_async_runtime(cli: &Cli) -> bool {
    match &cli.command {
        Commands::Use { .. } | Commands::Current { .. } | Commands::Export { .. } => false,
        Commands::Install { .. } | Commands::List { .. } | Commands::Update => true,
    }
}

/// Create tokio runtime and run async path
fn run_with_tokio(cli: Cli) -> i32 {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return 1;
        }
    };

    let json = cli.json;
    finish(rt.block_on(run_async(&cli)), json)
}

fn run_sync(cli: Cli) -> i32 {
    let json = cli.json;
    let result = commands::manager(&cli).and_then(|manager| match &cli.command {
        Commands::Use { target } => commands::select::execute(&manager, target),
        Commands::Current { candidate } => {
            commands::current::execute(&manager, candidate.as_deref())
        }
        Commands::Export { shell } => Ok(commands::export::execute(&manager, shell.as_deref())),
        Commands::Install { .. } | Commands::List { .. } | Commands::Update => Err(
            CliError::other("command requires the async runtime"),
        ),
    });
    finish(result, json)
}

async fn run_async(cli: &Cli) -> Result<Output, CliError> {
    let manager = commands::manager(cli)?;
    match &cli.command {
        Commands::Install { target } => commands::install::execute(&manager, target).await,
        Commands::List { candidate } => {
            commands::list::execute(&manager, candidate.as_deref()).await
        }
        Commands::Update => commands::update::execute(&manager).await,
        Commands::Use { .. } | Commands::Current { .. } | Commands::Export { .. } => {
            Err(CliError::other("command does not use the async runtime"))
        }
    }
}

/// Print the command result and map it to an exit code.
fn finish(result: Result<Output, CliError>, json: bool) -> i32 {
    match result {
        Ok(output) => {
            if json {
                match serde_json::to_string(&OkEnvelope::new(output.data)) {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        eprintln!("Error serializing response: {e}");
                        return 1;
                    }
                }
            } else if !output.text.is_empty() {
                println!("{}", output.text);
            }
            EXIT_OK
        }
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err, json);
            code
        }
    }
}
