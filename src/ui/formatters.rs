use colored::Colorize;

use crate::core::proc_table::{ProcTarget, VolumeTable};

/// Format a byte count in human-readable form (B, KB, MB, GB, TB)
pub fn format_size(size: u64) -> String {
    const KB: f64 = 1024.0;
    let size_f = size as f64;

    if size < 1024 {
        format!("{}B", size)
    } else if size_f < KB * KB {
        format!("{:.1}KB", size_f / KB)
    } else if size_f < KB * KB * KB {
        format!("{:.1}MB", size_f / (KB * KB))
    } else if size_f < KB * KB * KB * KB {
        format!("{:.1}GB", size_f / (KB * KB * KB))
    } else {
        format!("{:.1}TB", size_f / (KB * KB * KB * KB))
    }
}

fn target_lines(target: &ProcTarget) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        format!("[tid {}]", target.tid).yellow().bold(),
        target.name.cyan().bold()
    )];

    if target.luns.is_empty() {
        lines.push(format!("   {}", "(no LUNs)".dimmed()));
    }

    for (idx, lun) in target.luns.iter().enumerate() {
        let branch = if idx + 1 == target.luns.len() { "└─" } else { "├─" };
        let size = lun.size_bytes().map(format_size).unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "   {} LUN {:<3} {:<9} {:<8} {}",
            branch,
            lun.lun,
            size.green(),
            lun.iotype.as_deref().unwrap_or("-").magenta(),
            lun.path.as_deref().unwrap_or("-")
        ));
    }

    lines
}

/// Tree view of the parsed volume table, one block per target
pub fn render_volume_table(table: &VolumeTable) -> String {
    if table.is_empty() {
        return "No targets defined.".yellow().to_string();
    }

    table
        .targets()
        .iter()
        .flat_map(target_lines)
        .collect::<Vec<_>>()
        .join("\n")
}
