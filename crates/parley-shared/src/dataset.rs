//! Dataset loader for instruction/response pairs.
//!
//! A dataset directory holds `*.jsonl` files, one JSON object per line. Each
//! object names its query under one of several aliases and its answer under
//! another; lines that do not resolve to both are dropped without failing the
//! load. Nothing is cached: callers reload on every request so edits to the
//! directory take effect immediately.

use crate::error::ParleyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of files picked up by the loader
pub const DATASET_EXTENSION: &str = "jsonl";

/// Query aliases, highest priority first
pub const QUERY_KEYS: &[&str] = &["input", "instruction", "prompt"];

/// Response aliases, highest priority first
pub const RESPONSE_KEYS: &[&str] = &["response", "completion"];

/// A normalized prompt/response pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub prompt: String,
    pub response: String,
}

impl DatasetEntry {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Parse one dataset line.
///
/// Returns `None` for blank lines, invalid JSON, non-object values, and
/// objects missing either side after alias resolution.
pub fn parse_line(line: &str) -> Option<DatasetEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: Value = serde_json::from_str(line).ok()?;
    let obj = value.as_object()?;

    let prompt = first_text(obj, QUERY_KEYS)?;
    let response = first_text(obj, RESPONSE_KEYS)?;

    Some(DatasetEntry::new(prompt, response))
}

/// First alias holding a non-empty string
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse every line of one file's bytes, skipping the ones that don't resolve.
///
/// Lines are decoded one at a time so a stray non-UTF-8 line only costs itself.
fn parse_content(content: &[u8], origin: &Path) -> Vec<DatasetEntry> {
    content
        .split(|b| *b == b'\n')
        .enumerate()
        .filter_map(|(idx, raw)| match std::str::from_utf8(raw) {
            Ok(line) => Some((idx, line)),
            Err(_) => {
                debug!("Skipping {}:{} (not UTF-8)", origin.display(), idx + 1);
                None
            }
        })
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| {
            let entry = parse_line(line);
            if entry.is_none() {
                debug!("Skipping {}:{}", origin.display(), idx + 1);
            }
            entry
        })
        .collect()
}

/// Create the dataset directory if it does not exist yet
fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        debug!("Created dataset directory {}", dir.display());
    }
    Ok(())
}

/// Dataset files directly inside `dir`, sorted by file name
fn dataset_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Cannot scan dataset entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some(DATASET_EXTENSION))
        .collect()
}

/// Load every pair from the `*.jsonl` files in `dir` (non-recursive).
///
/// Never fails. A missing directory is created and yields an empty dataset;
/// an unreadable file is skipped with a warning.
pub fn load_dataset(dir: &Path) -> Vec<DatasetEntry> {
    if let Err(e) = ensure_dir(dir) {
        warn!("Cannot create dataset directory {}: {}", dir.display(), e);
        return Vec::new();
    }

    let mut entries = Vec::new();
    for path in dataset_files(dir) {
        match fs::read(&path) {
            Ok(content) => entries.extend(parse_content(&content, &path)),
            Err(e) => warn!("Cannot read dataset file {}: {}", path.display(), e),
        }
    }

    debug!("Loaded {} dataset entries from {}", entries.len(), dir.display());
    entries
}

/// Names of everything in the dataset directory, sorted.
///
/// Creates the directory when missing, like [`load_dataset`].
pub fn list_files(dir: &Path) -> Result<Vec<String>, ParleyError> {
    ensure_dir(dir)?;

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
