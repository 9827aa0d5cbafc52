//! CLI definitions.

use clap::Parser;
use std::path::PathBuf;

/// Minimal bug tracker REST backend (embedded key-value store)
#[derive(Parser, Debug)]
#[command(name = "bugtracker", author, version, about, long_about = None)]
pub struct Cli {
    /// Database path (default: bugs.db, or $DB_PATH)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(long)]
    pub bind: Option<String>,

    /// YAML config file (default: ./bugtracker.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Allowed CORS origin; repeat for several, `*` for any
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    pub cors_origins: Vec<String>,

    /// Seconds in-flight requests get to finish on shutdown
    #[arg(long, value_name = "SECS")]
    pub shutdown_grace: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "bugtracker",
            "--db",
            "/tmp/b.db",
            "--bind",
            "127.0.0.1:9000",
            "--cors-origin",
            "https://a.example",
            "--cors-origin",
            "https://b.example",
            "--shutdown-grace",
            "3",
            "-vv",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/b.db")));
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(cli.cors_origins.len(), 2);
        assert_eq!(cli.shutdown_grace, Some(3));
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert!(!cli.quiet);
    }

    #[test]
    fn rejects_non_numeric_grace() {
        assert!(Cli::try_parse_from(["bugtracker", "--shutdown-grace", "soon"]).is_err());
    }
}
