//! Opaque pagination tokens.
//!
//! A token is the URL-safe base64 (no padding) of the canonical JSON encoding of a flat
//! object: object keys sorted at every level, no insignificant whitespace. Canonical keys
//! make equal maps produce equal tokens regardless of insertion order.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value as JsonValue;

use crate::errors::CrudError;
use crate::models::JsonMap;

/// Serialize a map into an opaque token
#[must_use]
pub fn encode(map: &JsonMap) -> String {
    let canonical = canonicalize(&JsonValue::Object(map.clone()));
    URL_SAFE_NO_PAD.encode(canonical.to_string())
}

/// Recover the map behind a token. Empty input decodes to the empty map.
///
/// # Errors
///
/// Returns `CrudError::Validation` when the token is not base64, not JSON, or not a JSON
/// object.
pub fn decode(token: &str) -> Result<JsonMap, CrudError> {
    let token = token.trim().trim_end_matches('=');
    if token.is_empty() {
        return Ok(JsonMap::new());
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| CrudError::validation("malformed pagination token"))?;
    match serde_json::from_slice::<JsonValue>(&bytes) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err(CrudError::validation(
            "pagination token does not describe an object",
        )),
        Err(_) => Err(CrudError::validation("malformed pagination token")),
    }
}

/// Decode an optional token, absent meaning the empty map
///
/// # Errors
///
/// See [`decode`].
pub fn decode_opt(token: Option<&str>) -> Result<JsonMap, CrudError> {
    token.map_or_else(|| Ok(JsonMap::new()), decode)
}

fn canonicalize(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<(&String, &JsonValue)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonicalize(value)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
