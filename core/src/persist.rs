//! Writing decoded responses to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Decode a response body as JSON.
pub fn decode_json(response: &HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `response_<YYYYMMDD_HHMMSS>.json`, in local time.
pub fn timestamped_filename() -> PathBuf {
    PathBuf::from(format!(
        "response_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Where a save should land.
///
/// No filename means a timestamped one. A bare filename goes under
/// `output_dir`; absolute paths and paths with a directory are kept as given.
pub fn resolve_output_path(output_dir: &Path, filename: Option<&Path>) -> PathBuf {
    let filename = match filename {
        Some(name) if !name.as_os_str().is_empty() => name.to_path_buf(),
        _ => timestamped_filename(),
    };
    if filename.is_absolute() || has_directory(&filename) {
        filename
    } else {
        output_dir.join(filename)
    }
}

fn has_directory(path: &Path) -> bool {
    path.parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty())
}

/// Serialize with four-space indentation and no trailing newline.
pub fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Create missing parent directories, then overwrite `path` with `value`.
pub fn write_json(path: &Path, value: &Value) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = to_pretty_json(value)?;
    fs::write(path, text)
}
