//! Command-Line Interface (CLI) argument parsing.
//!
//! Arguments are parsed at startup with `clap` and then layered on top of the
//! configuration file and environment variables, so an explicit flag always
//! wins.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Reports nasne recording and disk metrics to mackerel-agent.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Host name or IP address of the nasne.
    #[arg(value_name = "DEVICE_ADDRESS")]
    pub address: String,

    /// Metric key prefix (default: nasne).
    #[arg(long, value_name = "PREFIX")]
    pub metric_key_prefix: Option<String>,

    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level written to stderr (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        // An empty prefix means "use the default", same as leaving the flag out.
        if let Some(prefix) = self.metric_key_prefix.as_deref().filter(|p| !p.is_empty()) {
            dict.insert("metric_key_prefix".into(), Value::from(prefix));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.as_str()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
