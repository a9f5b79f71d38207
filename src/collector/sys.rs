// src/collector/sys.rs
//! Module to define host identity and the payload shipped to the dashboard.
use super::nvme::HealthReport;
use super::smart_log::parse_report;
use serde_json::{Value, json};
use sysinfo::System;

/// Function to get timestamp
pub fn get_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Function to get hostname
pub fn get_hostname() -> String {
    hostname_or_unknown(System::host_name())
}

/// Hostname as reported, escaping is left to the json serializer.
pub fn hostname_or_unknown(name: Option<String>) -> String {
    name.filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Function to wrap a health report as a single json object.
pub fn get_nvme_payload(report: &HealthReport, parse_smart_log: bool) -> Value {
    let mut payload = json!({
        "timestamp": get_timestamp(),
        "hostname": get_hostname(),
        "nvme": report
    });

    if parse_smart_log {
        payload["smart_log"] = json!(parse_report(report));
    }

    payload
}
