use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::analysis::{DeletionPlan, PlanStatus};
use crate::engine::ScanResult;
use crate::error::Error;
use crate::executor::script::describe_collisions;
use crate::model::MediaItem;

const RULE: &str = "============================================================";

/// Human-readable size: `1.50 GB`. Zero renders as `unknown size`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "unknown size".to_string();
    }
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

/// Render the plain-text duplicate report.
pub fn render_report(result: &ScanResult, server_url: &str, generated_at: DateTime<Local>) -> String {
    let mut lines = vec![
        "Emby library duplicate report".to_string(),
        RULE.to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Server: {}", server_url),
        String::new(),
    ];

    for scan in &result.libraries {
        let summary = scan.summary();
        lines.push(format!("Library: {} ({})", scan.library.name, scan.library.kind));
        lines.push(format!(
            "Records: {} ({} usable files, {} skipped without size or path)",
            scan.records_fetched, scan.usable_items, scan.records_skipped
        ));
        for (item_type, count) in &scan.type_counts {
            lines.push(format!("  {}: {}", item_type, count));
        }

        if scan.plans.is_empty() {
            lines.push("No duplicates found".to_string());
        } else {
            lines.push(format!(
                "Found {} duplicate groups, {} reclaimable",
                summary.duplicate_groups,
                format_size(summary.reclaimable_bytes)
            ));
            for plan in &scan.plans {
                plan_lines(&mut lines, plan);
            }
        }
        lines.push(String::new());
    }

    for name in &result.failed_libraries {
        lines.push(format!("Library: {} (FAILED to fetch, not scanned)", name));
    }

    let summary = result.summary();
    lines.push(RULE.to_string());
    lines.push("Summary".to_string());
    lines.push(RULE.to_string());
    lines.push(format!("Records scanned: {}", result.total_records()));
    for (item_type, count) in result.type_totals() {
        lines.push(format!("{}: {}", item_type, count));
    }
    lines.push(format!("Duplicate groups: {}", summary.duplicate_groups));
    lines.push(format!("Safe groups: {}", summary.safe_groups));
    lines.push(format!("Unsafe groups: {}", summary.unsafe_groups));
    lines.push(format!("Removal candidates: {}", summary.candidates));
    lines.push(format!("Reclaimable: {}", format_size(summary.reclaimable_bytes)));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn plan_lines(lines: &mut Vec<String>, plan: &DeletionPlan) {
    lines.push(format!("  [{}]", plan.key()));
    lines.push(format!("    keep    {}", describe_item(plan.keep())));
    match plan.status() {
        PlanStatus::Safe => {
            for candidate in plan.candidates() {
                lines.push(format!("    remove  {}", describe_item(candidate)));
            }
        }
        PlanStatus::Unsafe(collisions) => {
            lines.push(format!("    UNSAFE  {}", describe_collisions(collisions)));
            for held in plan.held_back() {
                lines.push(format!("    held    {}", describe_item(held)));
            }
        }
    }
    for alias in plan.aliases() {
        lines.push(format!("    alias   {}", describe_item(alias)));
    }
}

fn describe_item(item: &MediaItem) -> String {
    let id = match &item.media_source_id {
        Some(source) => format!("{}/{}", item.id, source),
        None => item.id.clone(),
    };
    let mut text = format!("{} | {} | {}", item.path, format_size(item.size), id);
    if !item.info.is_empty() {
        text.push_str(" | ");
        text.push_str(&item.info);
    }
    text
}

/// Write the report to `<dir>/emby_library_report_<timestamp>.txt`.
pub fn write_report(result: &ScanResult, server_url: &str, dir: &Path) -> Result<PathBuf, Error> {
    let now = Local::now();
    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "emby_library_report_{}.txt",
        now.format("%Y%m%d_%H%M%S")
    ));
    fs::write(&path, render_report(result, server_url, now))?;
    info!("Report written to {}", path.display());
    Ok(path)
}
