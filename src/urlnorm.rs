//! Input URL normalization and validation
//!
//! Every analysis request starts here: the raw form/API string is trimmed,
//! checked for injection markers, and parsed into a canonical absolute
//! `http`/`https` URL. Nothing touches the network before this succeeds.

use crate::{Error, Result};
use url::Url;

/// Substrings that disqualify an input outright, checked case-insensitively.
const INJECTION_MARKERS: &[&str] = &["javascript:", "data:", "vbscript:", "<", ">"];

/// Canonicalize a raw input string into an absolute http(s) URL.
///
/// Rejects with [`Error::InvalidUrl`] on anything malformed or unsafe; the
/// returned string is the `url` crate's canonical serialization.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty input".to_string()));
    }

    // Legacy tolerance: some upstream forms concatenated the field name into
    // the value ("url=https://…"). Strip it before parsing.
    let candidate = trimmed.strip_prefix("url=").unwrap_or(trimmed);

    let lower = candidate.to_lowercase();
    for marker in INJECTION_MARKERS {
        if lower.contains(marker) {
            return Err(Error::InvalidUrl(format!(
                "input contains disallowed sequence '{}'",
                marker
            )));
        }
    }

    let parsed = Url::parse(candidate)
        .map_err(|e| Error::InvalidUrl(format!("parse failed: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    }

    if parsed.host_str().map_or(true, |h| h.is_empty()) {
        return Err(Error::InvalidUrl("missing host".to_string()));
    }

    Ok(parsed.to_string())
}
