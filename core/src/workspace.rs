//! Workspace-wide symbol search over `*.tjp` / `*.tji` files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::symbols::{Symbol, SymbolKind, extract_symbols};

pub const SOURCE_EXTENSIONS: &[&str] = &["tjp", "tji"];

const SEARCHED_KINDS: [SymbolKind; 4] = [
    SymbolKind::Task,
    SymbolKind::Resource,
    SymbolKind::Account,
    SymbolKind::Scenario,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceOptions {
    /// Directory names never descended into.
    pub exclude: Vec<String>,
    pub max_files: Option<usize>,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            exclude: vec!["node_modules".into(), ".git".into(), "target".into()],
            max_files: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceSymbol {
    pub path: PathBuf,
    pub symbol: Symbol,
}

/// The caller raised the cancel flag before the search finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("workspace search cancelled")
    }
}

impl std::error::Error for Cancelled {}

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// TaskJuggler files under `root`, sorted. Hidden and git-ignored entries are
/// skipped along with any directory named in `options.exclude`.
pub fn find_source_files(root: &Path, options: &WorkspaceOptions) -> Vec<PathBuf> {
    let exclude = options.exclude.clone();
    let walker = ignore::WalkBuilder::new(root)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && exclude.iter().any(|name| entry.file_name() == OsStr::new(name)))
        })
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable workspace entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| is_source_file(path))
        .collect();
    files.sort();
    if let Some(max) = options.max_files {
        files.truncate(max);
    }
    files
}

fn matches(symbol: &Symbol, query: &str) -> bool {
    query.is_empty() || symbol.id.to_lowercase().contains(query) || symbol.name.to_lowercase().contains(query)
}

/// Search every source file under `root` for tasks, resources, accounts and
/// scenarios whose id or name contains `query` (case-insensitive).
///
/// Files are parsed one at a time and `cancel` is checked before each one.
/// `overlay` supplies the current text of files open in an editor.
pub fn search_workspace(
    root: &Path,
    query: &str,
    options: &WorkspaceOptions,
    overlay: &HashMap<PathBuf, String>,
    cancel: &AtomicBool,
) -> Result<Vec<WorkspaceSymbol>, Cancelled> {
    let query = query.to_lowercase();
    let mut found = Vec::new();

    for path in find_source_files(root, options) {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!(root = %root.display(), "workspace search cancelled");
            return Err(Cancelled);
        }
        let text = match overlay.get(&path) {
            Some(text) => text.clone(),
            None => match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "cannot read workspace file");
                    continue;
                }
            },
        };
        let table = extract_symbols(&text);
        found.extend(
            SEARCHED_KINDS
                .iter()
                .flat_map(|&kind| table.of_kind(kind))
                .filter(|sym| matches(sym, &query))
                .map(|sym| WorkspaceSymbol {
                    path: path.clone(),
                    symbol: sym.clone(),
                }),
        );
    }
    Ok(found)
}
