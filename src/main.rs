use compute::Ledger;
use config::Config;
use console::Console;
use tracing_subscriber::EnvFilter;

mod compute;
mod config;
mod console;
mod data;
mod read;
mod write;

/// Logs go to stderr so they never interleave with the menu; `RUST_LOG` picks the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<(), anyhow::Error> {
    init_tracing();
    let config = Config::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let exit_pause = config.exit_pause;
    let (mut ledger, outcome) = Ledger::open(config)?;
    {
        let stdin = std::io::stdin();
        let mut console = Console::new(&mut ledger, stdin.lock(), std::io::stdout(), exit_pause);
        console.greet(&outcome)?;
        console.run()?;
    }
    tracing::info!(accounts = ledger.len(), "session ended");
    Ok(())
}
