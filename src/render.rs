//! Rendering and writing the agent's JSON config file
//!
//! Output is deterministic: keys are sorted and the same resolved config always yields
//! the same bytes, so comparing against the file on disk is enough to decide whether
//! the agent needs to be told about a change.

use crate::error::{ApiError, StorageError};
use crate::resolver::ResolvedConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Largest accepted indent width for pretty output.
pub const MAX_INDENT: usize = 16;

/// JSON layout options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub pretty: bool,
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 4,
        }
    }
}

/// What a write did to the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

impl WriteOutcome {
    /// True when file content differs from what was there before.
    pub fn changed(self) -> bool {
        !matches!(self, WriteOutcome::Unchanged)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteOutcome::Created => "created",
            WriteOutcome::Updated => "updated",
            WriteOutcome::Unchanged => "unchanged",
        }
    }
}

/// Serialize the resolved config to JSON text ending in a newline.
pub fn render(resolved: &ResolvedConfig, options: &RenderOptions) -> Result<String, ApiError> {
    let mut out = if options.pretty {
        let indent = vec![b' '; options.indent.min(MAX_INDENT)];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        resolved.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| ApiError::RenderFailed(e.to_string()))?
    } else {
        serde_json::to_string(resolved)?
    };
    out.push('\n');
    Ok(out)
}

/// Parse an octal permission string such as `"0664"` or `"640"`.
pub fn parse_mode(raw: &str) -> Result<u32, StorageError> {
    let digits = raw.trim().trim_start_matches("0o");
    if digits.is_empty() {
        return Err(StorageError::InvalidMode(format!("'{}' is empty", raw)));
    }
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|e| StorageError::InvalidMode(format!("'{}' is not octal: {}", raw, e)))?;
    if mode > 0o7777 {
        return Err(StorageError::InvalidMode(format!("'{}' exceeds 7777", raw)));
    }
    Ok(mode)
}

/// Write `content` to `path` only if it differs from the current file.
///
/// The write goes through a sibling temp file and a rename. The temp file carries `mode`
/// before it is renamed, so the content is never visible with looser permissions. The
/// parent directory is created when missing. `mode` is applied on every call, changed or not.
pub fn write_if_changed(
    path: &Path,
    content: &str,
    mode: Option<u32>,
) -> Result<WriteOutcome, StorageError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::InvalidPath(format!("{} has no file name", path.display())))?;

    let existing = match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(StorageError::IoError(e)),
    };

    let outcome = match existing {
        Some(ref bytes) if bytes.as_slice() == content.as_bytes() => WriteOutcome::Unchanged,
        Some(_) => WriteOutcome::Updated,
        None => WriteOutcome::Created,
    };

    if outcome.changed() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));
        let written =
            write_temp(&temp_path, content, mode).and_then(|()| fs::rename(&temp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::IoError(e));
        }
        info!(path = %path.display(), outcome = outcome.as_str(), "Config file written");
    } else {
        debug!(path = %path.display(), "Config file already up to date");
    }

    if let Some(mode) = mode {
        apply_mode(path, mode)?;
    }

    Ok(outcome)
}

/// Create `dir` and its parents. Returns true when anything was created.
pub fn ensure_dir(dir: &Path) -> Result<bool, StorageError> {
    if dir.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath("empty directory path".to_string()));
    }
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    info!(dir = %dir.display(), "Created directory");
    Ok(true)
}

#[cfg(unix)]
fn write_temp(temp_path: &Path, content: &str, mode: Option<u32>) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if let Some(mode) = mode {
        options.mode(mode);
    }
    let mut file = options.open(temp_path)?;
    if let Some(mode) = mode {
        // A stale temp file keeps its old mode, and the umask narrows `open`.
        file.set_permissions(fs::Permissions::from_mode(mode))?;
    }
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_temp(temp_path: &Path, content: &str, _mode: Option<u32>) -> std::io::Result<()> {
    fs::write(temp_path, content)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;

    let current = fs::metadata(path)?.permissions().mode() & 0o7777;
    if current != mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        debug!(path = %path.display(), mode = %format!("{:o}", mode), "Applied file mode");
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<(), StorageError> {
    Ok(())
}
