//! Canonical column and table naming.

use crate::error::{IngestError, IngestResult};

/// Lowercases letters and collapses every run of separator characters
/// (anything that is not alphanumeric, including `_`) into one underscore.
/// Leading and trailing separators are dropped.
///
/// Lowercasing can expand a letter (`İ` becomes `i` plus a combining dot);
/// expanded characters that are not alphanumeric count as separators, so
/// `normalize(&normalize(x)) == normalize(x)` still holds.
pub fn normalize(raw: &str) -> String {
    let mut canonical = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if !ch.is_alphanumeric() {
            pending_separator = true;
            continue;
        }
        for lower in ch.to_lowercase() {
            if !lower.is_alphanumeric() {
                pending_separator = true;
                continue;
            }
            if pending_separator && !canonical.is_empty() {
                canonical.push('_');
            }
            pending_separator = false;
            canonical.push(lower);
        }
    }
    canonical
}

/// Normalizes `raw` and rejects names that collapse to nothing.
pub fn canonical_name(raw: &str) -> IngestResult<String> {
    let canonical = normalize(raw);
    if canonical.is_empty() {
        return Err(IngestError::EmptyName {
            raw: raw.to_string(),
        });
    }
    Ok(canonical)
}

pub fn is_canonical(name: &str) -> bool {
    !name.is_empty() && normalize(name) == name
}
