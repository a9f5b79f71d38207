// src/main.rs
use anyhow::Result;
use nvmecollectd::collector::{NvmeCollector, SystemRunner, get_nvme_payload};
use nvmecollectd::config::Config;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;
    let collector = Arc::new(NvmeCollector::with_program(
        SystemRunner,
        config.nvme_bin.clone(),
    ));

    if !collector.is_tool_available() {
        tracing::warn!(
            program = %collector.program(),
            "nvme-cli not found, reports will carry the error until it is installed"
        );
    }

    if config.once {
        let payload = collect_payload(collector, config.parse_smart_log).await?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    tracing::info!("Sending NVMe health to UDP {}", config.target);

    loop {
        let payload = collect_payload(collector.clone(), config.parse_smart_log).await?;
        let bytes = serde_json::to_vec(&payload)?;

        match socket.send_to(&bytes, &config.target).await {
            Ok(_) => tracing::info!("Sent NVMe health to {} ({} bytes)", config.target, bytes.len()),
            Err(e) => tracing::error!("Failed to send UDP packet: {}", e),
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(config.interval_secs)) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}

/// Function to run one blocking collection off the async runtime.
async fn collect_payload(
    collector: Arc<NvmeCollector<SystemRunner>>,
    parse_smart_log: bool,
) -> Result<Value> {
    tokio::task::spawn_blocking(move || {
        let report = collector.get_health_data();
        get_nvme_payload(&report, parse_smart_log)
    })
    .await
    .map_err(|e| anyhow::anyhow!("collector task join: {}", e))
}
