// Linux-specific helpers: /proc, /sys cpufreq, power_supply, disk labels.
// Parsers take their root paths so tests can point them at a temp tree.

#![cfg_attr(not(target_os = "linux"), allow(dead_code))]

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::models::{BatteryReading, PartitionEntry, SecondsLeft};

pub(super) const PROC_MOUNTS: &str = "/proc/self/mounts";
pub(super) const PROC_FILESYSTEMS: &str = "/proc/filesystems";
pub(super) const CPUFREQ_ROOT: &str = "/sys/devices/system/cpu/cpu0/cpufreq";
pub(super) const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";
pub(super) const DISK_BY_LABEL: &str = "/dev/disk/by-label";

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// cpuinfo_min_freq / cpuinfo_max_freq under `root`, converted from kHz to MHz.
pub(super) fn read_cpufreq_bounds(root: &Path) -> (Option<f64>, Option<f64>) {
    let khz_to_mhz = |name: &str| {
        read_trimmed(&root.join(name))
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| *v > 0.0)
            .map(|khz| khz / 1000.0)
    };
    (khz_to_mhz("cpuinfo_min_freq"), khz_to_mhz("cpuinfo_max_freq"))
}

/// Filesystems backed by a block device: /proc/filesystems entries without `nodev`.
pub(super) fn parse_physical_filesystems(content: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    for line in content.lines() {
        if line.starts_with("nodev") {
            continue;
        }
        let fs = line.trim();
        if !fs.is_empty() {
            out.insert(fs.to_string());
        }
    }
    // zfs is registered nodev but its datasets are real storage.
    out.insert("zfs".to_string());
    out
}

/// Mount table lines whose filesystem type is physical, in file order.
pub(super) fn parse_mounts(content: &str, physical: &HashSet<String>) -> Vec<PartitionEntry> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            if device.is_empty() || device == "none" || !physical.contains(fs_type) {
                return None;
            }
            Some(PartitionEntry {
                device: decode_octal_escapes(device),
                mount_point: PathBuf::from(decode_octal_escapes(mount_point)),
                fs_type: fs_type.to_string(),
            })
        })
        .collect()
}

/// Partitions from /proc/self/mounts filtered by /proc/filesystems.
pub(super) fn read_partitions(mounts: &Path, filesystems: &Path) -> Result<Vec<PartitionEntry>, ProbeError> {
    let fs_table = fs::read_to_string(filesystems)
        .map_err(|e| ProbeError::io(format!("read {}", filesystems.display()), e))?;
    let mount_table = fs::read_to_string(mounts)
        .map_err(|e| ProbeError::io(format!("read {}", mounts.display()), e))?;
    Ok(parse_mounts(&mount_table, &parse_physical_filesystems(&fs_table)))
}

/// The kernel writes space, tab, newline and backslash in mount fields as `\ooo`.
fn decode_octal_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 4 <= bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
            && let Some(b) = std::str::from_utf8(&bytes[i + 1..i + 4])
                .ok()
                .and_then(|o| u8::from_str_radix(o, 8).ok())
        {
            out.push(b);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// udev writes unsafe label characters as `\xHH`.
fn decode_hex_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && bytes.get(i + 1) == Some(&b'x')
            && i + 4 <= bytes.len()
            && let Some(b) = std::str::from_utf8(&bytes[i + 2..i + 4])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok())
        {
            out.push(b);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Label whose by-label symlink resolves to `device`, or None if it has none.
pub(super) fn label_for_device(by_label: &Path, device: &str) -> io::Result<Option<String>> {
    let entries = match fs::read_dir(by_label) {
        Ok(e) => e,
        // No labelled volumes on this host.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let target = fs::canonicalize(device).unwrap_or_else(|_| PathBuf::from(device));
    for entry in entries.flatten() {
        let Ok(resolved) = fs::canonicalize(entry.path()) else {
            continue;
        };
        if resolved == target {
            let raw = entry.file_name();
            return Ok(Some(decode_hex_escapes(&raw.to_string_lossy())));
        }
    }
    Ok(None)
}

/// First `Battery` supply under `root`; AC adapters decide the plugged state.
pub(super) fn read_battery(root: &Path) -> Result<BatteryReading, ProbeError> {
    let entries = match fs::read_dir(root) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ProbeError::NoBattery),
        Err(e) => return Err(ProbeError::io(format!("read {}", root.display()), e)),
    };
    let mut dirs: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    dirs.sort();

    let mut battery_dir = None;
    let mut ac_online: Option<bool> = None;
    for dir in &dirs {
        match read_trimmed(&dir.join("type")).as_deref() {
            Some("Battery") => {
                // Peripheral batteries (mice, keyboards) report scope=Device.
                let peripheral = read_trimmed(&dir.join("scope")).as_deref() == Some("Device");
                if battery_dir.is_none() && !peripheral {
                    battery_dir = Some(dir.as_path());
                }
            }
            Some("Mains") | Some("USB") => {
                if let Some(online) = read_u64(&dir.join("online")) {
                    ac_online = Some(ac_online.unwrap_or(false) || online == 1);
                }
            }
            _ => {}
        }
    }
    let dir = battery_dir.ok_or(ProbeError::NoBattery)?;

    let energy_now = read_u64(&dir.join("energy_now"));
    let power_now = read_u64(&dir.join("power_now"));
    let charge_now = read_u64(&dir.join("charge_now"));
    let current_now = read_u64(&dir.join("current_now"));

    let percent = read_u64(&dir.join("capacity"))
        .map(|c| c as f64)
        .or_else(|| ratio(energy_now, read_u64(&dir.join("energy_full"))))
        .or_else(|| ratio(charge_now, read_u64(&dir.join("charge_full"))))
        .ok_or_else(|| ProbeError::Unavailable(format!("{} reports no capacity", dir.display())))?;

    let status = read_trimmed(&dir.join("status"));
    let discharging = status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("discharging"));
    let power_plugged = ac_online.unwrap_or(!discharging);

    let secs_left = if power_plugged {
        SecondsLeft::Unlimited
    } else {
        match (energy_now, power_now, charge_now, current_now) {
            (Some(e), Some(p), _, _) if p > 0 => SecondsLeft::Seconds(e * 3600 / p),
            (_, _, Some(c), Some(i)) if i > 0 => SecondsLeft::Seconds(c * 3600 / i),
            _ => SecondsLeft::Unknown,
        }
    };

    Ok(BatteryReading {
        percent: percent.clamp(0.0, 100.0),
        secs_left,
        power_plugged,
    })
}

fn ratio(now: Option<u64>, full: Option<u64>) -> Option<f64> {
    match (now, full) {
        (Some(n), Some(f)) if f > 0 => Some(n as f64 / f as f64 * 100.0),
        _ => None,
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    let v = fs::read_to_string(path).ok()?;
    let v = v.trim();
    if v.is_empty() {
        return None;
    }
    Some(v.to_string())
}

fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILESYSTEMS: &str = "nodev\tsysfs\nnodev\tproc\nnodev\ttmpfs\n\text4\n\tvfat\nnodev\tzfs\n";

    fn write(dir: &Path, name: &str, value: &str) {
        fs::write(dir.join(name), value).unwrap();
    }

    fn supply(root: &Path, name: &str, files: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (k, v) in files {
            write(&dir, k, v);
        }
    }

    #[test]
    fn physical_filesystems_skip_nodev_but_keep_zfs() {
        let fs = parse_physical_filesystems(FILESYSTEMS);
        assert!(fs.contains("ext4"));
        assert!(fs.contains("vfat"));
        assert!(fs.contains("zfs"));
        assert!(!fs.contains("tmpfs"));
    }

    #[test]
    fn parse_mounts_keeps_physical_in_order_and_decodes_spaces() {
        let physical = parse_physical_filesystems(FILESYSTEMS);
        let mounts = "sysfs /sys sysfs rw 0 0\n\
                      /dev/sda2 / ext4 rw,relatime 0 0\n\
                      tmpfs /run tmpfs rw 0 0\n\
                      /dev/sda1 /boot/efi vfat rw 0 0\n\
                      /dev/sdb1 /media/My\\040Disk ext4 rw 0 0\n";
        let parts = parse_mounts(mounts, &physical);
        let mounts: Vec<_> = parts.iter().map(|p| p.mount_point.clone()).collect();
        assert_eq!(
            mounts,
            vec![
                PathBuf::from("/"),
                PathBuf::from("/boot/efi"),
                PathBuf::from("/media/My Disk")
            ]
        );
        assert_eq!(parts[1].device, "/dev/sda1");
        assert_eq!(parts[1].fs_type, "vfat");
    }

    #[test]
    fn hex_escapes_in_labels_are_decoded() {
        assert_eq!(decode_hex_escapes("My\\x20Data"), "My Data");
        assert_eq!(decode_hex_escapes("plain"), "plain");
        assert_eq!(decode_hex_escapes("trailing\\x2"), "trailing\\x2");
    }

    #[cfg(unix)]
    #[test]
    fn label_for_device_follows_symlinks() {
        let dir = tempfile::TempDir::new().unwrap();
        let dev = dir.path().join("sda1");
        fs::write(&dev, "").unwrap();
        let by_label = dir.path().join("by-label");
        fs::create_dir(&by_label).unwrap();
        std::os::unix::fs::symlink(&dev, by_label.join("Backup\\x20Drive")).unwrap();

        let label = label_for_device(&by_label, dev.to_str().unwrap()).unwrap();
        assert_eq!(label.as_deref(), Some("Backup Drive"));

        let other = dir.path().join("sdb1");
        fs::write(&other, "").unwrap();
        assert_eq!(label_for_device(&by_label, other.to_str().unwrap()).unwrap(), None);
    }

    #[test]
    fn label_for_device_without_label_dir_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let label = label_for_device(&dir.path().join("missing"), "/dev/sda1").unwrap();
        assert_eq!(label, None);
    }

    #[test]
    fn cpufreq_bounds_convert_khz() {
        let dir = tempfile::TempDir::new().unwrap();
        write(dir.path(), "cpuinfo_min_freq", "800000\n");
        write(dir.path(), "cpuinfo_max_freq", "3600000\n");
        assert_eq!(read_cpufreq_bounds(dir.path()), (Some(800.0), Some(3600.0)));
        let empty = tempfile::TempDir::new().unwrap();
        assert_eq!(read_cpufreq_bounds(empty.path()), (None, None));
    }

    #[test]
    fn battery_missing_root_is_no_battery() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = read_battery(&dir.path().join("power_supply")).unwrap_err();
        assert!(matches!(err, ProbeError::NoBattery));
    }

    #[test]
    fn battery_only_mains_is_no_battery() {
        let dir = tempfile::TempDir::new().unwrap();
        supply(dir.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        let err = read_battery(dir.path()).unwrap_err();
        assert!(matches!(err, ProbeError::NoBattery));
    }

    #[test]
    fn battery_discharging_estimates_seconds_left() {
        let dir = tempfile::TempDir::new().unwrap();
        supply(dir.path(), "AC", &[("type", "Mains"), ("online", "0")]);
        supply(
            dir.path(),
            "BAT0",
            &[
                ("type", "Battery"),
                ("status", "Discharging"),
                ("capacity", "64"),
                ("energy_now", "30000000"),
                ("power_now", "10000000"),
            ],
        );
        let b = read_battery(dir.path()).unwrap();
        assert_eq!(b.percent, 64.0);
        assert!(!b.power_plugged);
        assert_eq!(b.secs_left, SecondsLeft::Seconds(3 * 3600));
    }

    #[test]
    fn battery_plugged_in_is_unlimited() {
        let dir = tempfile::TempDir::new().unwrap();
        supply(
            dir.path(),
            "BAT1",
            &[
                ("type", "Battery"),
                ("status", "Charging"),
                ("charge_now", "2500000"),
                ("charge_full", "5000000"),
            ],
        );
        let b = read_battery(dir.path()).unwrap();
        assert_eq!(b.percent, 50.0);
        assert!(b.power_plugged);
        assert_eq!(b.secs_left, SecondsLeft::Unlimited);
    }

    #[test]
    fn peripheral_battery_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        supply(
            dir.path(),
            "hidpp_battery_0",
            &[("type", "Battery"), ("scope", "Device"), ("capacity", "90")],
        );
        let err = read_battery(dir.path()).unwrap_err();
        assert!(matches!(err, ProbeError::NoBattery));
    }
}
