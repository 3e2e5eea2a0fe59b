use std::path::Path;

use pwmerge_core::emit::write_snapshot;
use pwmerge_core::source::{EtcFiles, JsonSnapshotFile, SnapshotSource};
use pwmerge_core::{merge_databases, MergePolicy, MergeReport};

use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct MergeOptions<'a> {
    pub remote: &'a Path,
    pub output_dir: &'a Path,
    pub etc_dir: &'a Path,
    pub policy: MergePolicy,
    pub dry_run: bool,
    pub json: bool,
}

pub fn run_merge(options: &MergeOptions<'_>) -> Result<(), CliError> {
    // The remote snapshot is checked before the local files are touched.
    let remote = JsonSnapshotFile::new(options.remote).load()?;
    let local = EtcFiles::new(options.etc_dir).load()?;

    let outcome = merge_databases(local, &remote, &options.policy)?;

    let written = if options.dry_run {
        None
    } else {
        Some(write_snapshot(options.output_dir, &outcome.database)?)
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    for line in format_report_lines(&outcome.report) {
        println!("{line}");
    }
    if let Some(written) = written {
        for path in [&written.passwd, &written.group, &written.shadow] {
            println!("{}", path.display());
        }
    }
    Ok(())
}

pub fn format_report_lines(report: &MergeReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.missing_system_users.is_empty() {
        lines.push(format!(
            "Missing system users (install their packages): {}",
            report.missing_system_users.join(", ")
        ));
    }
    if !report.missing_system_groups.is_empty() {
        lines.push(format!(
            "Missing system groups (install their packages): {}",
            report.missing_system_groups.join(", ")
        ));
    }
    if !report.added_groups.is_empty() {
        lines.push(format!("Added groups: {}", report.added_groups.join(", ")));
    }
    if !report.added_users.is_empty() {
        lines.push(format!("Added users: {}", report.added_users.join(", ")));
    }

    for (kind, collisions, reassignments) in [
        ("group", &report.group_collisions, &report.group_reassignments),
        ("user", &report.user_collisions, &report.user_reassignments),
    ] {
        for (collision, reassignment) in collisions.iter().zip(reassignments) {
            lines.push(format!(
                "Added {kind} '{}' as id {} (id {} belongs to '{}')",
                reassignment.name, reassignment.assigned_id, collision.id, collision.existing
            ));
        }
    }

    if !report.added_aging.is_empty() {
        lines.push(format!(
            "Added aging records: {}",
            report.added_aging.join(", ")
        ));
    }
    for name in &report.aging_divergences {
        lines.push(format!(
            "Aging record for '{name}' differs on the remote host; kept local"
        ));
    }

    if report.is_noop() {
        lines.push("Nothing to merge".to_string());
    }
    lines
}
