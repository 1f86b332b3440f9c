// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote manifest parsing.
//!
//! Parsing fails closed: anything that is not a JSON object with a non-empty
//! string `version` is rejected as a whole.

use plugsync_core::{FetchedManifest, SyncError};
use serde_json::{Map, Value};

/// Parse the body of a remote `plugin.json` / `cwplugin.json`.
pub fn parse_manifest(url: &str, body: &[u8]) -> Result<FetchedManifest, SyncError> {
    let doc: Map<String, Value> = match serde_json::from_slice(body) {
        Ok(Value::Object(doc)) => doc,
        Ok(_) => return Err(SyncError::malformed(url, "manifest must be a JSON object")),
        Err(e) => return Err(SyncError::malformed(url, format!("invalid JSON: {e}"))),
    };

    let version = match doc.get("version") {
        Some(Value::String(v)) if !v.trim().is_empty() => v.trim().to_string(),
        Some(Value::String(_)) => return Err(SyncError::malformed(url, "`version` is empty")),
        Some(_) => return Err(SyncError::malformed(url, "`version` must be a string")),
        None => return Err(SyncError::malformed(url, "`version` is missing")),
    };

    let update_date = match doc.get("update_date") {
        None | Some(Value::Null) => None,
        Some(Value::String(d)) if d.trim().is_empty() => None,
        Some(Value::String(d)) => Some(d.trim().to_string()),
        Some(_) => return Err(SyncError::malformed(url, "`update_date` must be a string")),
    };

    let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(FetchedManifest {
        version,
        update_date,
        name: text("name"),
        description: text("description"),
        author: text("author"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugsync_core::ErrorKind;

    const URL: &str = "https://raw.example/a/b/main/plugin.json";

    #[test]
    fn parses_version_and_descriptive_fields() {
        let body = br#"{"name": "Weather", "version": "1.2.0", "author": "a",
                        "description": "d", "update_date": "2024/03/01", "extra": [1]}"#;
        let manifest = parse_manifest(URL, body).unwrap();
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.update_date.as_deref(), Some("2024/03/01"));
        assert_eq!(manifest.name.as_deref(), Some("Weather"));
    }

    #[test]
    fn blank_update_date_is_absent() {
        let manifest = parse_manifest(URL, br#"{"version": "1.0", "update_date": ""}"#).unwrap();
        assert!(manifest.update_date.is_none());
    }

    #[test]
    fn rejects_bad_documents() {
        let bodies: [&[u8]; 6] = [
            b"not json",
            br#"["version"]"#,
            br#"{"name": "x"}"#,
            br#"{"version": ""}"#,
            br#"{"version": 2}"#,
            br#"{"version": "1.0", "update_date": 20240301}"#,
        ];
        for body in bodies {
            let err = parse_manifest(URL, body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedManifest, "body: {body:?}");
        }
    }
}
