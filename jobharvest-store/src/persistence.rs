//! File persistence helpers.
//!
//! Every write goes to a temporary sibling first and is renamed into place,
//! so an interrupted run never leaves a truncated file behind.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/jobharvest`
/// - Linux: `~/.config/jobharvest`
/// - Windows: `%APPDATA%\jobharvest`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("jobharvest"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

// ============================================================================
// File Operations
// ============================================================================

/// Writes bytes atomically (temp file + rename), creating parent directories.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, contents).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Saves data to a pretty-printed JSON file.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, json.as_bytes()).await?;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Ensures a directory and its parents exist.
pub(crate) async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Ensuring directory");
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
