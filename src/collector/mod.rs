// src/collector/mod.rs

pub mod command;
pub mod nvme;
pub mod smart_log;
pub mod sys;

pub use sys::{get_hostname, get_nvme_payload, get_timestamp, hostname_or_unknown};

pub use command::{CommandOutput, CommandRunner, SystemRunner};

pub use nvme::{
    DeviceHealth, DeviceHealthMap, DiagnosticError, HealthReport, NvmeCollector,
    parse_device_list,
};

pub use smart_log::{NvmeSmartLog, parse_report};
