//! Mirrors the agent's virtual files into a sandboxed directory on disk.
//!
//! The agent writes files under absolute in-conversation paths like
//! `/report.md`; those land here as paths relative to the mirror root. Paths
//! that would escape the root are skipped, never written.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub fn mirror(root: &Path, files: &BTreeMap<String, String>) -> io::Result<()> {
    for (virtual_path, contents) in files {
        let Some(relative) = sandboxed(virtual_path) else {
            tracing::warn!(path = %virtual_path, "skipping file that would escape the data directory");
            continue;
        };
        let target = root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, contents)?;
    }
    Ok(())
}

/// Maps an absolute in-conversation path to a path relative to the mirror
/// root. Returns `None` for empty paths and anything with non-plain
/// components (`..`, a second root, drive prefixes).
fn sandboxed(virtual_path: &str) -> Option<PathBuf> {
    let trimmed = virtual_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let relative = Path::new(trimmed);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(relative.to_path_buf())
}
