//! Broker configuration.
//!
//! Layered with the `config` crate, lowest precedence first: built-in
//! defaults, an optional config file, `KV_BROKER_*` environment variables
//! (plus the bare `VERBOSE`), then command-line flags.

use crate::args::Args;
use crate::guard::{AccessGuard, BasicCredentials};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "KV_BROKER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub ip: String,
    pub port: u16,
    /// Overrides the request's Host header in store URLs.
    #[serde(default)]
    pub host_string: Option<String>,
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub disable_auth: bool,
    #[serde(default)]
    pub verbose: Option<u8>,
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: 8080,
            host_string: None,
            user: "user".to_string(),
            password: "passw0rd".to_string(),
            disable_auth: false,
            verbose: None,
            catalog: None,
        }
    }
}

impl BrokerConfig {
    /// Assembles the configuration from every source.
    pub fn load(args: &Args) -> Result<Self> {
        let verbose_env = std::env::var("VERBOSE")
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok());
        Self::load_with(args, Environment::with_prefix(ENV_PREFIX), verbose_env)
    }

    fn load_with(args: &Args, env: Environment, verbose_env: Option<u8>) -> Result<Self> {
        let defaults = BrokerConfig::default();

        let mut builder = Config::builder()
            .set_default("ip", defaults.ip)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("user", defaults.user)?
            .set_default("password", defaults.password)?
            .set_default("disable_auth", defaults.disable_auth)?;

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()));
        }
        builder = builder
            .add_source(env.try_parsing(true))
            .set_override_option("verbose", verbose_env.map(i64::from))?
            .set_override_option("verbose", args.verbose.map(i64::from))?
            .set_override_option("port", args.port.map(i64::from))?
            .set_override_option("ip", args.ip.clone())?
            .set_override_option("host_string", args.host_string.clone())?
            .set_override_option("user", args.user.clone())?
            .set_override_option("password", args.password.clone())?
            .set_override_option(
                "catalog",
                args.catalog
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?;
        if args.disable_auth {
            builder = builder.set_override("disable_auth", true)?;
        }

        builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Address string for the listener, `ip:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub fn guard(&self) -> AccessGuard {
        AccessGuard::new(
            BasicCredentials::new(self.user.clone(), self.password.clone()),
            self.disable_auth,
        )
    }

    /// Log level for the configured verbosity, if any.
    pub fn log_level(&self) -> Option<LevelFilter> {
        self.verbose.map(|v| match v {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
    }
}
