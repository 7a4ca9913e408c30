use std::fs;
use std::path::Path;

use tracing::info;

use crate::analysis::{Collision, DeletionPlan, PlanStatus};
use crate::error::Error;

/// Render a POSIX shell script removing every candidate of every safe plan.
///
/// Unsafe groups only show up as comments listing what was held back.
pub fn render_script<'a, I>(plans: I, header: &str) -> String
where
    I: IntoIterator<Item = &'a DeletionPlan>,
{
    let mut lines = vec!["#!/bin/sh".to_string()];
    lines.extend(header.lines().map(|line| format!("# {}", line)));
    lines.push(String::new());

    for plan in plans {
        lines.push(format!("# group: {}", plan.key()));
        lines.push(format!("# keep: {}", plan.keep().path));
        match plan.status() {
            PlanStatus::Safe => {
                for candidate in plan.candidates() {
                    lines.push(format!("rm -f -- {}", shell_quote(&candidate.path)));
                }
            }
            PlanStatus::Unsafe(collisions) => {
                lines.push(format!("# UNSAFE: {}", describe_collisions(collisions)));
                for held in plan.held_back() {
                    lines.push(format!("#   not removed: {} (id {})", held.path, held.id));
                }
            }
        }
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write the removal script to `path`. Returns the number of `rm` lines written.
pub fn write_script<'a, I>(plans: I, header: &str, path: &Path) -> Result<usize, Error>
where
    I: IntoIterator<Item = &'a DeletionPlan>,
{
    let script = render_script(plans, header);
    let commands = script.lines().filter(|l| l.starts_with("rm ")).count();
    fs::write(path, script)?;
    make_executable(path)?;
    info!("Wrote {} removal commands to {}", commands, path.display());
    Ok(commands)
}

pub fn describe_collisions(collisions: &[Collision]) -> String {
    collisions
        .iter()
        .map(|c| match c {
            Collision::SharedId(id) => format!("catalog id {} shared with the kept copy", id),
            Collision::SharedPath(path) => format!("{} is the kept file itself", path),
            Collision::MergedEntry(id) => {
                format!("catalog id {} also covers files outside this group", id)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Single-quote a string for `sh`, escaping embedded single quotes.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), Error> {
    Ok(())
}
