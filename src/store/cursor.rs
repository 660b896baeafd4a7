//! Opaque pagination cursors.
//!
//! A cursor is the last key of the previous page, URL-safe base64 encoded.
//! Only the store that issued it can interpret it: decoding checks that the
//! key lies inside the store's own prefix.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use super::StoreError;

pub(crate) fn encode(last_key: &str) -> String {
    URL_SAFE_NO_PAD.encode(last_key.as_bytes())
}

pub(crate) fn decode(cursor: &str, key_prefix: &str) -> Result<String, StoreError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor.as_bytes())
        .map_err(|e| StoreError::InvalidCursor(format!("not base64: {}", e)))?;
    let key = String::from_utf8(bytes)
        .map_err(|_| StoreError::InvalidCursor("not utf-8".into()))?;

    if key.len() <= key_prefix.len() || !key.starts_with(key_prefix) {
        return Err(StoreError::InvalidCursor(format!(
            "cursor does not belong to {}",
            key_prefix.trim_end_matches(':')
        )));
    }

    Ok(key)
}
