use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use train_positions::app::{RunError, run};
use train_positions::config::{AppConfig, DEBUG_VAR};

/// Initialize tracing on stderr so stdout carries only train lines.
///
/// `RUST_LOG` wins over the debug flag when both are set.
fn init_tracing(debug: bool) {
    let default = if debug {
        "train_positions=debug"
    } else {
        "train_positions=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Read the debug flag directly so logging is up before config errors
    let debug = std::env::var(DEBUG_VAR).is_ok_and(|v| !v.trim().is_empty());
    init_tracing(debug);

    let result = match AppConfig::from_env() {
        Ok(config) => run(&config, &mut std::io::stdout().lock()).await,
        Err(e) => Err(RunError::from(e)),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
