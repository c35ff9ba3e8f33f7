//! Suggested filename handling.
//!
//! Extracts the filename a server suggests via Content-Disposition and turns
//! it into a safe local name for the temporary output file.

mod content_disposition;
mod sanitize;

use anyhow::{Context, Result};

pub use content_disposition::{parse_disposition, Disposition};
pub use sanitize::sanitize_filename;

/// Name used when the server suggests nothing usable.
pub const UNKNOWN_FILENAME: &str = "unknown-filename";

/// Returns the `filename` parameter of a Content-Disposition value.
///
/// An empty header yields an empty name. A header without a `filename`
/// parameter also yields an empty name. Malformed syntax is an error.
///
/// See RFC 2183 section 2.3.
pub fn extract_filename(header_value: &str) -> Result<String> {
    if header_value.is_empty() {
        return Ok(String::new());
    }
    let disposition = parse_disposition(header_value)
        .with_context(|| format!("parse Content-Disposition {:?}", header_value))?;
    Ok(disposition
        .params
        .get("filename")
        .cloned()
        .unwrap_or_default())
}

/// Local file name for a suggested name: sanitized, or [`UNKNOWN_FILENAME`]
/// when nothing is left.
pub fn safe_output_name(suggested: &str) -> String {
    let sanitized = sanitize_filename(suggested);
    if sanitized.is_empty() {
        UNKNOWN_FILENAME.to_string()
    } else {
        sanitized
    }
}
