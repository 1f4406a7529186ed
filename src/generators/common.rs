//! Common utilities for document generation.
//!
//! Shared helpers for date formatting, file naming and template escaping.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Placeholder injected into every context with the generation date.
pub const CURRENT_DATE_PLACEHOLDER: &str = "cur_date";

/// Format a date in long form (e.g., "October 18, 2026").
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Escape text for insertion into a WordprocessingML text node.
pub fn escape_xml_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Longest stem in bytes; leaves room for `<prefix>_`, `_<suffix>` and the extension
/// within the usual 255-byte file name limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Turn a subject name into a filename-safe stem.
///
/// Spaces and slashes become underscores, anything the filesystem would reject is dropped.
pub fn file_stem(name: &str, fallback: &str) -> String {
    let replaced = name.trim().replace([' ', '/'], "_");
    let mut cleaned = sanitize_filename::sanitize(replaced);

    if cleaned.len() > MAX_STEM_BYTES {
        let mut end = MAX_STEM_BYTES;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Random 8 hex character suffix used to keep generated names unique.
pub fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Pick `<dir>/<prefix>_<stem>_<suffix>.<ext>`, redrawing the suffix while the file exists.
pub fn unique_output_path(dir: &Path, prefix: &str, stem: &str, extension: &str) -> PathBuf {
    loop {
        let candidate = dir.join(format!("{}_{}_{}.{}", prefix, stem, short_suffix(), extension));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// File name component of a path as an owned string.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
