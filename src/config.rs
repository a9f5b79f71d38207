// src/config.rs
use clap::Parser;

/// Command line and environment configuration for the daemon.
#[derive(Debug, Clone, Parser)]
#[command(name = "nvmecollectd", version, about = "NVMe health collector built on nvme-cli")]
pub struct Config {
    /// UDP address the JSON reports are sent to.
    #[arg(long, env = "METRICS_TARGET", default_value = "127.0.0.1:1555")]
    pub target: String,

    /// Seconds between two collections.
    #[arg(long, env = "NVME_POLL_INTERVAL_SECS", default_value_t = 10)]
    pub interval_secs: u64,

    /// nvme-cli executable, looked up on PATH unless it is a path.
    #[arg(long, env = "NVME_CLI_BIN", default_value = "nvme")]
    pub nvme_bin: String,

    /// Attach a parsed `smart_log` array next to the raw text.
    /// The env var accepts only `true` or `false`.
    #[arg(long, env = "NVME_PARSE_SMART_LOG")]
    pub parse_smart_log: bool,

    /// Print one report to stdout and exit.
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.target.is_empty() && self.target.contains(':'),
            "target must be host:port, got {:?}",
            self.target
        );
        anyhow::ensure!(
            self.interval_secs > 0,
            "interval_secs must be > 0, got {}",
            self.interval_secs
        );
        anyhow::ensure!(!self.nvme_bin.is_empty(), "nvme_bin must be non-empty");
        Ok(())
    }
}
