// src/collector/nvme.rs
//! NVMe inventory and health collection via the nvme-cli tool.

use super::command::{CommandRunner, SystemRunner};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::io;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Program name looked up on the search path by default.
pub const NVME_PROGRAM: &str = "nvme";

/// Substring nvme-cli prints for NVMe device nodes.
pub const NVME_DEVICE_PREFIX: &str = "/dev/nvme";

/// Key used by [`HealthReport`] when the device list could not be produced.
pub const ERROR_KEY: &str = "error";

/// Why the device list could not be produced.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Error: '{program}' command not found. Ensure 'nvme-cli' is installed.")]
    ToolMissing { program: String },

    #[error("Error: Unable to retrieve NVMe device list. {stderr}")]
    ListFailed { stderr: String },

    #[error("Unexpected error while listing NVMe devices: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
}

/// Outcome of the smart-log fetch for a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceHealth {
    /// Trimmed stdout of a successful fetch.
    Healthy(String),
    /// The tool exited non-zero; trimmed stderr.
    CommandFailed { stderr: String },
    /// The tool could not be started or its output not captured.
    Fault { message: String },
}

impl DeviceHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, DeviceHealth::Healthy(_))
    }
}

impl fmt::Display for DeviceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceHealth::Healthy(text) => f.write_str(text),
            DeviceHealth::CommandFailed { stderr } => {
                write!(f, "Error retrieving data: {}", stderr)
            }
            DeviceHealth::Fault { message } => write!(f, "Error: {}", message),
        }
    }
}

impl Serialize for DeviceHealth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Device path -> health, kept in enumeration order.
///
/// Re-inserting a device replaces its value in place, so the keys are always
/// exactly the distinct devices that were listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceHealthMap {
    entries: Vec<(String, DeviceHealth)>,
}

impl DeviceHealthMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, device: String, health: DeviceHealth) {
        match self.entries.iter_mut().find(|(name, _)| *name == device) {
            Some(entry) => entry.1 = health,
            None => self.entries.push((device, health)),
        }
    }

    pub fn get(&self, device: &str) -> Option<&DeviceHealth> {
        self.entries
            .iter()
            .find(|(name, _)| name == device)
            .map(|(_, health)| health)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceHealth)> {
        self.entries
            .iter()
            .map(|(name, health)| (name.as_str(), health))
    }
}

impl Serialize for DeviceHealthMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (device, health) in &self.entries {
            map.serialize_entry(device, health)?;
        }
        map.end()
    }
}

/// Result of one collection pass.
#[derive(Debug)]
pub enum HealthReport {
    /// One entry per listed device. May be empty.
    Devices(DeviceHealthMap),
    /// Listing failed, no device was queried.
    ListingFailed(DiagnosticError),
}

impl HealthReport {
    pub fn is_listing_error(&self) -> bool {
        matches!(self, HealthReport::ListingFailed(_))
    }

    /// Flat string view: `{"error": msg}` for a listing failure, otherwise
    /// one `device -> payload or error string` pair per device.
    pub fn flatten(&self) -> Vec<(String, String)> {
        match self {
            HealthReport::Devices(devices) => devices
                .iter()
                .map(|(device, health)| (device.to_string(), health.to_string()))
                .collect(),
            HealthReport::ListingFailed(err) => vec![(ERROR_KEY.to_string(), err.to_string())],
        }
    }
}

impl Serialize for HealthReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HealthReport::Devices(devices) => devices.serialize(serializer),
            HealthReport::ListingFailed(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(ERROR_KEY, &err.to_string())?;
                map.end()
            }
        }
    }
}

/// Collector for NVMe devices driven by the nvme-cli tool.
///
/// Holds no state between calls; every method re-runs the tool.
#[derive(Debug, Clone)]
pub struct NvmeCollector<R = SystemRunner> {
    runner: R,
    program: String,
}

impl Default for NvmeCollector<SystemRunner> {
    fn default() -> Self {
        Self::new(SystemRunner)
    }
}

impl<R: CommandRunner> NvmeCollector<R> {
    pub fn new(runner: R) -> Self {
        Self::with_program(runner, NVME_PROGRAM)
    }

    pub fn with_program(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Function to check whether the nvme tool can be found.
    pub fn is_tool_available(&self) -> bool {
        self.runner.locate(&self.program).is_some()
    }

    /// Function to list NVMe device paths reported by `nvme list`.
    #[instrument(skip(self), fields(collector = "nvme", operation = "list_devices"))]
    pub fn list_devices(&self) -> Result<Vec<String>, DiagnosticError> {
        if !self.is_tool_available() {
            return Err(DiagnosticError::ToolMissing {
                program: self.program.clone(),
            });
        }

        let output = self
            .runner
            .run(&self.program, &["list"])
            .map_err(|source| DiagnosticError::Spawn { source })?;

        if !output.success() {
            return Err(DiagnosticError::ListFailed {
                stderr: output.stderr,
            });
        }

        let devices = parse_device_list(&output.stdout);
        debug!(count = devices.len(), "listed NVMe devices");
        Ok(devices)
    }

    /// Function to collect the smart-log text of every listed device.
    #[instrument(skip(self), fields(collector = "nvme", operation = "get_health_data"))]
    pub fn get_health_data(&self) -> HealthReport {
        let devices = match self.list_devices() {
            Ok(devices) => devices,
            Err(err) => {
                warn!(error = %err, "NVMe device listing failed");
                return HealthReport::ListingFailed(err);
            }
        };

        let mut health = DeviceHealthMap::new();
        for device in devices {
            let entry = self.fetch_smart_log(&device);
            if !entry.is_healthy() {
                warn!(device = %device, error = %entry, "failed to fetch SMART log");
            }
            health.insert(device, entry);
        }

        HealthReport::Devices(health)
    }

    fn fetch_smart_log(&self, device: &str) -> DeviceHealth {
        match self.runner.run(&self.program, &["smart-log", device]) {
            Ok(output) if output.success() => {
                DeviceHealth::Healthy(output.stdout.trim().to_string())
            }
            Ok(output) => DeviceHealth::CommandFailed {
                stderr: output.stderr.trim().to_string(),
            },
            Err(e) => DeviceHealth::Fault {
                message: e.to_string(),
            },
        }
    }
}

/// Function to extract device paths from `nvme list` output.
///
/// A line names a device when it contains [`NVME_DEVICE_PREFIX`]; the device
/// is its first token. Order and duplicates are kept as printed.
pub fn parse_device_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains(NVME_DEVICE_PREFIX))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
