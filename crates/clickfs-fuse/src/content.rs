//! Canonical rendering of remote records into file content.
//!
//! The same bytes back both the reported `st_size` and every `read`, so a
//! record is always rendered through [`canonical_bytes`].

use serde_json::Value;

use crate::error::Result;
use crate::source::{Record, SourceError};

/// Two-space indented JSON with keys in sorted order.
pub fn canonical_bytes(record: &Record) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(record).map_err(|e| {
        SourceError::Malformed {
            what: "record".to_string(),
            msg: e.to_string(),
        }
        .into()
    })
}

/// `content[offset .. offset + length]`, clipped to the content length.
/// Offsets at or past the end give an empty slice.
pub fn slice(content: &[u8], offset: u64, length: u32) -> &[u8] {
    let len = content.len() as u64;
    let start = offset.min(len);
    let end = offset.saturating_add(length as u64).min(len);
    &content[start as usize..end as usize]
}

/// Strip the single-key wrapper the API puts around payloads
/// (`{"user": {...}}`). Records without that wrapper are returned unchanged.
pub fn unwrap_envelope(mut record: Record, key: &str) -> Record {
    if record.len() == 1 {
        if let Some(Value::Object(_)) = record.get(key) {
            if let Some(Value::Object(inner)) = record.remove(key) {
                return inner;
            }
        }
    }
    record
}

/// Identifier of a record as a path segment. String ids are used verbatim,
/// numeric ids in decimal form.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
