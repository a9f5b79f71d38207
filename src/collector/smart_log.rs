// src/collector/smart_log.rs
//! Typed view over the text printed by `nvme smart-log`.

use super::nvme::{DeviceHealth, HealthReport};
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct NvmeSmartLog {
    /// NVMe device path (e.g., "/dev/nvme0n1")
    pub nvme_name: String,

    /// Critical Warning bitmask:
    /// Bit 0: Available spare below threshold
    /// Bit 1: Temperature threshold condition
    /// Bit 2: NVM subsystem degraded reliability
    /// Bit 3: All media read-only
    /// Bit 4: Volatile memory backup failed
    /// Bit 5: Persistent memory region read-only
    /// A value of 0 means no critical warnings
    pub critical_warning: Option<u64>,

    /// Composite Temperature in Kelvins
    pub temperature: Option<u64>,

    /// Available Spare, normalized percentage (0-100%)
    pub avail_spare: Option<u64>,

    /// Available Spare Threshold, normalized percentage (0-100%)
    pub spare_thresh: Option<u64>,

    /// Percentage Used, vendor estimate of life used. May exceed 100.
    pub percent_used: Option<u64>,

    /// Endurance Group Critical Warning Summary
    pub endurance_grp_critical_warning_summary: Option<u64>,

    /// Data Units Read, in thousands of 512-byte units
    pub data_units_read: Option<u64>,

    /// Data Units Written, in thousands of 512-byte units
    pub data_units_written: Option<u64>,

    pub host_read_commands: Option<u64>,
    pub host_write_commands: Option<u64>,

    /// Controller Busy Time, in minutes
    pub controller_busy_time: Option<u64>,

    pub power_cycles: Option<u64>,
    pub power_on_hours: Option<u64>,
    pub unsafe_shutdowns: Option<u64>,

    /// Media and Data Integrity Errors
    pub media_errors: Option<u64>,

    pub num_err_log_entries: Option<u64>,

    /// Minutes spent at or above the Warning Composite Temperature Threshold
    pub warning_temp_time: Option<u64>,

    /// Minutes spent at or above the Critical Composite Temperature Threshold
    pub critical_comp_time: Option<u64>,

    /// Temperature sensors 1-8 in Kelvins
    pub temperature_sensor_1: Option<u64>,
    pub temperature_sensor_2: Option<u64>,
    pub temperature_sensor_3: Option<u64>,
    pub temperature_sensor_4: Option<u64>,
    pub temperature_sensor_5: Option<u64>,
    pub temperature_sensor_6: Option<u64>,
    pub temperature_sensor_7: Option<u64>,
    pub temperature_sensor_8: Option<u64>,

    /// Thermal Management Temperature 1/2 transition counts
    pub thm_temp1_trans_count: Option<u64>,
    pub thm_temp2_trans_count: Option<u64>,

    /// Thermal Management Temperature 1/2 total time, in seconds
    pub thm_temp1_total_time: Option<u64>,
    pub thm_temp2_total_time: Option<u64>,
}

impl NvmeSmartLog {
    /// Parse the `label : value` lines of a smart-log payload.
    /// Labels that are missing or unknown leave their field as `None`.
    pub fn parse(nvme_name: &str, text: &str) -> Self {
        let mut log = Self {
            nvme_name: nvme_name.to_string(),
            ..Self::default()
        };

        for line in text.lines() {
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let label = normalize_label(label);
            let value = value.trim();

            match label.as_str() {
                "critical_warning" => log.critical_warning = parse_count(value),
                "temperature" => log.temperature = parse_kelvin(value),
                "available_spare" => log.avail_spare = parse_count(value),
                "available_spare_threshold" => log.spare_thresh = parse_count(value),
                "percentage_used" => log.percent_used = parse_count(value),
                "endurance_group_critical_warning_summary" => {
                    log.endurance_grp_critical_warning_summary = parse_count(value)
                }
                "data_units_read" => log.data_units_read = parse_count(value),
                "data_units_written" => log.data_units_written = parse_count(value),
                "host_read_commands" => log.host_read_commands = parse_count(value),
                "host_write_commands" => log.host_write_commands = parse_count(value),
                "controller_busy_time" => log.controller_busy_time = parse_count(value),
                "power_cycles" => log.power_cycles = parse_count(value),
                "power_on_hours" => log.power_on_hours = parse_count(value),
                "unsafe_shutdowns" => log.unsafe_shutdowns = parse_count(value),
                "media_errors" => log.media_errors = parse_count(value),
                "num_err_log_entries" => log.num_err_log_entries = parse_count(value),
                "warning_temperature_time" => log.warning_temp_time = parse_count(value),
                "critical_composite_temperature_time" => {
                    log.critical_comp_time = parse_count(value)
                }
                "temperature_sensor_1" => log.temperature_sensor_1 = parse_kelvin(value),
                "temperature_sensor_2" => log.temperature_sensor_2 = parse_kelvin(value),
                "temperature_sensor_3" => log.temperature_sensor_3 = parse_kelvin(value),
                "temperature_sensor_4" => log.temperature_sensor_4 = parse_kelvin(value),
                "temperature_sensor_5" => log.temperature_sensor_5 = parse_kelvin(value),
                "temperature_sensor_6" => log.temperature_sensor_6 = parse_kelvin(value),
                "temperature_sensor_7" => log.temperature_sensor_7 = parse_kelvin(value),
                "temperature_sensor_8" => log.temperature_sensor_8 = parse_kelvin(value),
                "thermal_management_t1_trans_count" => {
                    log.thm_temp1_trans_count = parse_count(value)
                }
                "thermal_management_t2_trans_count" => {
                    log.thm_temp2_trans_count = parse_count(value)
                }
                "thermal_management_t1_total_time" => {
                    log.thm_temp1_total_time = parse_count(value)
                }
                "thermal_management_t2_total_time" => {
                    log.thm_temp2_total_time = parse_count(value)
                }
                _ => {}
            }
        }

        log
    }
}

/// Function to parse every healthy device of a report, in report order.
pub fn parse_report(report: &HealthReport) -> Vec<NvmeSmartLog> {
    match report {
        HealthReport::Devices(devices) => devices
            .iter()
            .filter_map(|(device, health)| match health {
                DeviceHealth::Healthy(text) => Some(NvmeSmartLog::parse(device, text)),
                _ => None,
            })
            .collect(),
        HealthReport::ListingFailed(_) => Vec::new(),
    }
}

/// "Warning Temperature Time" -> "warning_temperature_time"
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// First token of a value, tolerating "12,345", "100%" and "0x4".
fn parse_count(value: &str) -> Option<u64> {
    let token = value.split_whitespace().next()?;
    let token = token.trim_end_matches('%').replace(',', "");

    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

/// Temperature in Kelvins. nvme-cli prints "38 °C (311 K)", older builds
/// print "311 K" or "38 C". A bare number is taken as Kelvins.
fn parse_kelvin(value: &str) -> Option<u64> {
    let tokens: Vec<&str> = value.split_whitespace().collect();

    for pair in tokens.windows(2) {
        if pair[1].trim_end_matches(')') == "K" {
            if let Ok(kelvin) = pair[0].trim_start_matches('(').parse::<u64>() {
                return Some(kelvin);
            }
        }
    }

    let first = *tokens.first()?;
    let number = first.trim_end_matches('C').trim_end_matches('°');
    let celsius_unit =
        number.len() != first.len() || tokens.get(1).is_some_and(|unit| unit.ends_with('C'));
    let reading: i64 = number.parse().ok()?;

    if celsius_unit {
        reading
            .checked_add(273)
            .and_then(|kelvin| u64::try_from(kelvin).ok())
    } else {
        u64::try_from(reading).ok()
    }
}
