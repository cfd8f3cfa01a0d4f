use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracemon_core::poller::{DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS, MIN_INTERVAL_MS};

/// Live strip chart of a single host counter.
#[derive(Debug, Parser)]
#[command(name = "tracemon", version, about)]
pub struct Args {
    /// Counter identifier, e.g. `cpu`, `memory/used`, `network/eth0/rx`.
    #[arg(required_unless_present = "list_counters")]
    pub counter: Option<String>,

    /// Poll interval in milliseconds.
    #[arg(
        default_value_t = DEFAULT_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(MIN_INTERVAL_MS..=MAX_INTERVAL_MS),
    )]
    pub interval_ms: u64,

    /// Config file (defaults to $XDG_CONFIG_HOME/tracemon/tracemon.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the supported counter identifiers and exit.
    #[arg(long)]
    pub list_counters: bool,
}

impl Args {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("tracemon").chain(argv.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn counter_with_default_interval() {
        let args = parse(&["cpu"]).unwrap();
        assert_eq!(args.counter.as_deref(), Some("cpu"));
        assert_eq!(args.interval(), Duration::from_millis(DEFAULT_INTERVAL_MS));
    }

    #[test]
    fn explicit_interval() {
        let args = parse(&["memory/used", "250"]).unwrap();
        assert_eq!(args.interval_ms, 250);
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        assert!(parse(&["cpu", "100"]).is_ok());
        assert!(parse(&["cpu", "10000"]).is_ok());
        assert_eq!(
            parse(&["cpu", "99"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["cpu", "10001"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
    }

    #[test]
    fn counter_is_required() {
        assert_eq!(
            parse(&[]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn listing_needs_no_counter() {
        let args = parse(&["--list-counters"]).unwrap();
        assert!(args.list_counters);
        assert!(args.counter.is_none());
    }
}
