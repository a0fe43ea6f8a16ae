use clap::Parser;
use std::{ffi::OsString, path::PathBuf, time::Duration};

pub const DEFAULT_STORE: &str = "accounts.json";
pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 1000;

/// When the ledger writes itself back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Full rewrite after every successful create/deposit/withdraw.
    #[default]
    EveryMutation,
    /// Mutations only mark the ledger dirty; `Ledger::flush` writes it out.
    OnExit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub flush: FlushPolicy,
    /// Write to a temp file and rename it over the store.
    pub atomic_writes: bool,
    pub max_generation_attempts: u32,
    /// How long the console lingers after saying goodbye.
    pub exit_pause: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE),
            flush: FlushPolicy::default(),
            atomic_writes: true,
            max_generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
            exit_pause: Duration::from_secs(1),
        }
    }
}

/// Console banking: create accounts, deposit, withdraw and check balances
#[derive(Parser, Debug)]
#[command(name = "console-bank", version, about, long_about = None)]
struct Cli {
    /// Path to the account store
    #[arg(value_name = "PATH", default_value = DEFAULT_STORE)]
    store: PathBuf,

    /// Write the store once when the session ends instead of after every change
    #[arg(long)]
    flush_on_exit: bool,

    /// Rewrite the store in place rather than through a temp file
    #[arg(long)]
    no_atomic_writes: bool,

    /// Give up creating an account after this many account number collisions
    #[arg(long, value_name = "N", default_value_t = DEFAULT_GENERATION_ATTEMPTS,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            store_path: cli.store,
            flush: if cli.flush_on_exit {
                FlushPolicy::OnExit
            } else {
                FlushPolicy::EveryMutation
            },
            atomic_writes: !cli.no_atomic_writes,
            max_generation_attempts: cli.max_attempts,
            ..Self::default()
        }
    }
}

impl Config {
    /// Builds the configuration from the process arguments (program name first). Help,
    /// version and usage errors come back as `clap::Error`, ready for `exit()`.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, FlushPolicy, DEFAULT_STORE};
    use std::path::Path;

    #[test]
    fn defaults() {
        let config = Config::from_args(["bank"]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store_path, Path::new(DEFAULT_STORE));
        assert_eq!(config.flush, FlushPolicy::EveryMutation);
        assert!(config.atomic_writes);
    }
    #[test]
    fn store_path_argument() {
        let config = Config::from_args(["bank", "/tmp/other.json"]).unwrap();
        assert_eq!(config.store_path, Path::new("/tmp/other.json"));
    }
    #[test]
    fn storage_flags() {
        let config = Config::from_args([
            "bank",
            "--flush-on-exit",
            "--no-atomic-writes",
            "--max-attempts",
            "5",
            "x.json",
        ])
        .unwrap();
        assert_eq!(config.store_path, Path::new("x.json"));
        assert_eq!(config.flush, FlushPolicy::OnExit);
        assert!(!config.atomic_writes);
        assert_eq!(config.max_generation_attempts, 5);
    }
    #[test]
    fn bad_arguments() {
        assert!(Config::from_args(["bank", "a.json", "b.json"]).is_err());
        assert!(Config::from_args(["bank", "--max-attempts", "0"]).is_err());
        assert!(Config::from_args(["bank", "--unknown"]).is_err());
    }
}
