//! Command-line flags of the `kv-broker` binary.
//!
//! Every flag is optional: anything left out falls back to the config file,
//! the environment and finally the built-in defaults (see [`crate::config`]).

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "Open Service Broker for an in-memory key/value store", long_about = None)]
pub struct Args {
    /// Verbosity level (0 = warnings only, 3 = everything)
    #[arg(short, long)]
    pub verbose: Option<u8>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// IP/interface to listen on
    #[arg(short, long)]
    pub ip: Option<String>,

    /// Host/port string to use in store URLs instead of the request's Host header
    #[arg(short = 'H', long)]
    pub host_string: Option<String>,

    /// Username for broker/store admin
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for broker/store admin
    #[arg(short = 'w', long)]
    pub password: Option<String>,

    /// Turn off all auth checking
    #[arg(short = 'a', long)]
    pub disable_auth: bool,

    /// Config file (toml, json or yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Catalog JSON file replacing the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let args = Args::parse_from([
            "kv-broker", "-v", "2", "-p", "9000", "-i", "127.0.0.1", "-H", "db.example:80", "-u",
            "admin", "-w", "secret", "-a",
        ]);

        assert_eq!(args.verbose, Some(2));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.host_string.as_deref(), Some("db.example:80"));
        assert_eq!(args.user.as_deref(), Some("admin"));
        assert_eq!(args.password.as_deref(), Some("secret"));
        assert!(args.disable_auth);
    }

    #[test]
    fn test_everything_optional() {
        let args = Args::parse_from(["kv-broker"]);

        assert!(args.port.is_none());
        assert!(!args.disable_auth);
        assert!(args.config.is_none());
    }
}
