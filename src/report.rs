// Multi-line text report of a snapshot, one section per reading

use std::fmt;

use crate::format::human_bytes;
use crate::models::Snapshot;

/// Display adapter rendering the full report of a snapshot.
pub struct TextReport<'a>(pub &'a Snapshot);

pub fn render_text(s: &Snapshot) -> String {
    TextReport(s).to_string()
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(
            out,
            "Snapshot #{} at {}",
            s.epoch,
            s.collected_at.format("%Y-%m-%d %H:%M:%S")
        )?;

        writeln!(out, "\n== System")?;
        writeln!(out, "  System:    {}", s.os.name)?;
        writeln!(out, "  Node:      {}", s.os.node)?;
        writeln!(out, "  Release:   {}", s.os.release)?;
        writeln!(out, "  Version:   {}", s.os.version)?;
        writeln!(out, "  Machine:   {}", s.os.machine)?;
        writeln!(out, "  Processor: {}", s.os.processor)?;
        writeln!(out, "  Boot time: {}", s.boot)?;

        writeln!(out, "\n== CPU")?;
        let physical = s
            .cpu
            .physical_cores
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".into());
        writeln!(out, "  Physical cores: {physical}")?;
        writeln!(out, "  Total cores:    {}", s.cpu.logical_cores)?;
        let mhz = |v: Option<f64>| v.map(|f| format!("{f:.2}Mhz")).unwrap_or_else(|| "n/a".into());
        writeln!(out, "  Max frequency:  {}", mhz(s.cpu.max_freq_mhz))?;
        writeln!(out, "  Min frequency:  {}", mhz(s.cpu.min_freq_mhz))?;
        writeln!(out, "  Current:        {}", mhz(s.cpu.current_freq_mhz))?;
        for (core, usage) in &s.cpu.per_core_usage {
            writeln!(out, "  Core {core}: {usage:.1}%")?;
        }
        writeln!(out, "  Total usage: {:.1}%", s.cpu.total_usage)?;

        writeln!(out, "\n== Memory")?;
        let m = &s.memory;
        writeln!(out, "  Total:     {}", human_bytes(m.total))?;
        writeln!(out, "  Available: {}", human_bytes(m.available))?;
        writeln!(out, "  Used:      {} ({:.1}%)", human_bytes(m.used), m.percent)?;
        writeln!(
            out,
            "  Swap:      {} total, {} free, {} used ({:.1}%)",
            human_bytes(m.swap_total),
            human_bytes(m.swap_free),
            human_bytes(m.swap_used),
            m.swap_percent
        )?;

        writeln!(out, "\n== Disks")?;
        for p in &s.disk.partitions {
            writeln!(out, "  {} on {} ({})", p.device, p.mount_point.display(), p.fs_type)?;
            if !p.label.is_empty() {
                writeln!(out, "    Label: {}", p.label)?;
            }
            match &p.usage {
                Some(u) => writeln!(
                    out,
                    "    {} total, {} used, {} free ({:.1}%)",
                    human_bytes(u.total),
                    human_bytes(u.used),
                    human_bytes(u.free),
                    u.percent
                )?,
                None => writeln!(out, "    usage unavailable")?,
            }
        }

        writeln!(out, "\n== Network")?;
        for iface in &s.network.interfaces {
            writeln!(out, "  {}", iface.name)?;
            for a in &iface.addresses {
                write!(out, "    {} {}", a.family, a.address)?;
                if let Some(mask) = &a.netmask {
                    write!(out, " netmask {mask}")?;
                }
                if let Some(brd) = &a.broadcast {
                    write!(out, " broadcast {brd}")?;
                }
                writeln!(out)?;
            }
        }

        writeln!(out, "\n== Battery")?;
        match &s.battery {
            Some(b) => {
                writeln!(out, "  Charge:    {:.0}%", b.percent)?;
                writeln!(out, "  Plugged:   {}", b.power_plugged)?;
                writeln!(out, "  Time left: {}", b.secs_left)?;
            }
            None => writeln!(out, "  not present")?,
        }
        Ok(())
    }
}
