//! Workspace listing for the demo's file list.
//!
//! Walks a directory a few levels deep and loads the result into a
//! two-column list control (Name, Kind), directories first.

use crate::list::{ControlWithItems, HeaderBar, RowId};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// How deep below the root the listing goes.
pub const MAX_DEPTH: usize = 3;

/// Directory names never listed.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntry {
    pub path: PathBuf,
    pub name: String,
    /// 1 for direct children of the root
    pub depth: usize,
    pub is_dir: bool,
}

impl WorkspaceEntry {
    /// Text of the Kind column.
    pub fn kind(&self) -> String {
        if self.is_dir {
            return "Folder".to_string();
        }
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{} file", ext.to_uppercase()),
            None => "File".to_string(),
        }
    }
}

/// Dot files worth showing.
fn is_allowed_dot_file(name: &str) -> bool {
    matches!(name, ".gitignore" | ".env" | ".editorconfig")
}

fn is_listed(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') && !is_allowed_dot_file(&name) {
        return false;
    }
    !(entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref()))
}

/// Directories first, then case-insensitive by name.
fn listing_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.file_type().is_dir(), b.file_type().is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .cmp(&b.file_name().to_string_lossy().to_lowercase()),
    }
}

/// List `root` depth-first, at most `max_depth` levels down.
pub fn scan_workspace(root: &Path, max_depth: usize) -> Vec<WorkspaceEntry> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by(listing_order)
        .into_iter()
        .filter_entry(is_listed);

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable workspace entry: {}", e);
                continue;
            }
        };
        entries.push(WorkspaceEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            depth: entry.depth(),
            is_dir: entry.file_type().is_dir(),
            path: entry.into_path(),
        });
    }
    debug!("Scanned {} entries under {}", entries.len(), root.display());
    entries
}

/// Replace the list content with `entries`. Sub-folders start collapsed.
///
/// Returns the path behind every row.
pub fn populate_list(list: &mut ControlWithItems, entries: &[WorkspaceEntry]) -> HashMap<RowId, PathBuf> {
    list.clear();
    if list.header().is_empty() {
        let mut header = HeaderBar::default();
        header.add_column("Name", 0.0);
        header.add_column("Kind", 0.0);
        list.set_header(header);
        list.do_update_header(None);
    }

    let mut rows = HashMap::new();
    let mut parents: HashMap<PathBuf, RowId> = HashMap::new();
    let mut folders = Vec::new();
    for entry in entries {
        let parent = entry.path.parent().and_then(|p| parents.get(p)).copied();
        let id = list.append_row(parent, vec![entry.name.clone(), entry.kind()]);
        if entry.is_dir {
            parents.insert(entry.path.clone(), id);
            if entry.depth > 1 {
                folders.push(id);
            }
        }
        rows.insert(id, entry.path.clone());
    }
    // innermost first so parents don't re-show collapsed children
    for id in folders.into_iter().rev() {
        list.set_expanded(id, false);
    }
    rows
}
