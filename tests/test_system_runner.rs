use nvmecollectd::collector::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const FAKE_NVME: &str = r#"#!/bin/sh
case "$1" in
  list)
    echo "Node          SN    Model"
    echo "/dev/nvme0n1  SN1   Fake Disk"
    echo "/dev/sda      SN9   Spinning Rust"
    echo "/dev/nvme1n1  SN2   Fake Disk"
    ;;
  smart-log)
    if [ "$2" = "/dev/nvme0n1" ]; then
      printf 'critical_warning : 0\ntemperature : 38 C\n\n'
    else
      echo "NVMe status: timeout " >&2
      exit 1
    fi
    ;;
esac
"#;

const DENIED_NVME: &str = "#!/bin/sh\necho 'permission denied' >&2\nexit 1\n";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// One test function: every script is written before any child is spawned.
#[test]
fn test_system_runner_against_fake_nvme() {
    let dir = tempfile::tempdir().unwrap();
    let fake = write_script(dir.path(), "nvme", FAKE_NVME);
    let denied = write_script(dir.path(), "nvme-denied", DENIED_NVME);
    let absent = dir.path().join("nvme-absent");

    let output = SystemRunner.run(fake.to_str().unwrap(), &["smart-log", "/dev/nvme9n9"]).unwrap();
    assert_eq!(output.code, Some(1));
    assert!(!output.success());
    assert_eq!(output.stderr, "NVMe status: timeout \n");

    let collector = NvmeCollector::with_program(SystemRunner, fake.to_str().unwrap());
    assert!(collector.is_tool_available());
    assert_eq!(
        collector.list_devices().unwrap(),
        vec!["/dev/nvme0n1", "/dev/nvme1n1"]
    );
    assert_eq!(
        collector.get_health_data().flatten(),
        vec![
            (
                "/dev/nvme0n1".to_string(),
                "critical_warning : 0\ntemperature : 38 C".to_string()
            ),
            (
                "/dev/nvme1n1".to_string(),
                "Error retrieving data: NVMe status: timeout".to_string()
            ),
        ]
    );

    let collector = NvmeCollector::with_program(SystemRunner, denied.to_str().unwrap());
    let report = collector.get_health_data();
    assert!(report.is_listing_error());
    assert!(report.flatten()[0].1.contains("permission denied"));

    let collector = NvmeCollector::with_program(SystemRunner, absent.to_str().unwrap());
    assert!(!collector.is_tool_available());
    assert!(matches!(
        collector.list_devices(),
        Err(DiagnosticError::ToolMissing { .. })
    ));
}
