// src/job/decode.rs

//! Transport decoding: base64 → UTF-8 → JSON → raw documents.
//!
//! Encoded payloads are often pasted straight out of a rendered template, so
//! surrounding whitespace, line wrapping and one layer of matching quotes
//! are tolerated. Broken base64, UTF-8 or JSON, or a document of the wrong
//! kind, raises [`PaperboyError::DecodeError`]. Once a document parses,
//! problems with its fields are [`PaperboyError::ValidationError`]s that
//! name the job or report.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{PaperboyError, Result};
use crate::job::model::{EntityId, RawId, RawJob, RawReport};

/// Decode one base64-encoded JSON document.
///
/// `what` names the document in error messages (e.g. `"job"`).
pub fn decode_document(encoded: &str, what: &str) -> Result<Value> {
    let cleaned = strip_transport_noise(encoded);

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| PaperboyError::DecodeError(format!("{what}: malformed base64: {e}")))?;

    let text = String::from_utf8(bytes)
        .map_err(|e| PaperboyError::DecodeError(format!("{what}: payload is not UTF-8: {e}")))?;

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| PaperboyError::DecodeError(format!("{what}: invalid JSON: {e}")))?;

    debug!(document = what, bytes = text.len(), "decoded transport payload");
    Ok(value)
}

/// Decode the job document. Returns the typed view alongside the original
/// JSON so the setup task can receive it untouched.
pub fn decode_job(encoded: &str) -> Result<(RawJob, Value)> {
    let value = decode_document(encoded, "job")?;
    let raw = raw_job_from_value(&value)?;
    Ok((raw, value))
}

/// Decode the reports document, which must be a JSON array.
pub fn decode_reports(encoded: &str) -> Result<Vec<RawReport>> {
    let value = decode_document(encoded, "reports")?;
    raw_reports_from_value(value)
}

/// Typed view of a job document.
///
/// The id is read first so that any later field error can name the job.
pub fn raw_job_from_value(value: &Value) -> Result<RawJob> {
    let Value::Object(map) = value else {
        return Err(PaperboyError::DecodeError(format!(
            "job: expected a JSON object, got {}",
            json_kind(value)
        )));
    };

    let id = entity_id(map.get("id"))
        .map_err(|e| PaperboyError::ValidationError(format!("job: {e}")))?
        .ok_or_else(|| {
            PaperboyError::ValidationError(
                "job document is missing required field 'id'".to_string(),
            )
        })?;

    RawJob::deserialize(value).map_err(|e| {
        PaperboyError::ValidationError(format!("job {id}: {}", field_error::<RawJob>(map, e)))
    })
}

/// Typed view of every report in a reports array.
///
/// Field errors name the report id, or its position when the id is absent.
pub fn raw_reports_from_value(value: Value) -> Result<Vec<RawReport>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(PaperboyError::DecodeError(format!(
                "reports: expected a JSON array, got {}",
                json_kind(&other)
            )));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let Value::Object(map) = item else {
                return Err(PaperboyError::ValidationError(format!(
                    "report at position {idx}: expected a JSON object, got {}",
                    json_kind(item)
                )));
            };

            let subject = match entity_id(map.get("id")) {
                Ok(Some(id)) => format!("report {id}"),
                Ok(None) => format!("report at position {idx}"),
                Err(e) => {
                    return Err(PaperboyError::ValidationError(format!(
                        "report at position {idx}: {e}"
                    )));
                }
            };

            RawReport::deserialize(item).map_err(|e| {
                PaperboyError::ValidationError(format!(
                    "{subject}: {}",
                    field_error::<RawReport>(map, e)
                ))
            })
        })
        .collect()
}

/// Read an id field. `Ok(None)` when absent, null or blank.
fn entity_id(value: Option<&Value>) -> std::result::Result<Option<EntityId>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => RawId::deserialize(v)
            .map(|id| id.normalize())
            .map_err(|_| format!("'id' must be a string or an integer, got {v}")),
    }
}

/// Find the field behind a failed typed deserialization by retrying each
/// field on its own; falls back to the original message.
fn field_error<T: DeserializeOwned>(map: &Map<String, Value>, err: serde_json::Error) -> String {
    map.iter()
        .find_map(|(key, v)| {
            let single = Value::Object(Map::from_iter([(key.clone(), v.clone())]));
            T::deserialize(&single).err().map(|e| format!("{key}: {e}"))
        })
        .unwrap_or_else(|| err.to_string())
}

/// Remove whitespace anywhere and one layer of wrapping quotes.
fn strip_transport_noise(encoded: &str) -> String {
    let trimmed = encoded.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);

    unquoted.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        STANDARD.encode(s)
    }

    #[test]
    fn decodes_job_with_quotes_and_wrapping() {
        let b64 = encode(r#"{"id": 42, "owner": "a", "start_date": "01/01/2024 00:00:00"}"#);
        let (head, tail) = b64.split_at(8);
        let noisy = format!("  '{head}\n{tail}'  ");

        let (raw, value) = decode_job(&noisy).unwrap();
        assert_eq!(raw.id, Some(RawId::Int(42)));
        assert_eq!(raw.owner.as_deref(), Some("a"));
        assert_eq!(value["start_date"], "01/01/2024 00:00:00");
    }

    #[test]
    fn malformed_base64_is_decode_error() {
        let err = decode_job("not*base64!").unwrap_err();
        assert!(matches!(err, PaperboyError::DecodeError(msg) if msg.contains("base64")));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = decode_reports(&encode("[{\"id\": 1,")).unwrap_err();
        assert!(matches!(err, PaperboyError::DecodeError(msg) if msg.contains("invalid JSON")));
    }

    #[test]
    fn non_utf8_is_decode_error() {
        let err = decode_document(&STANDARD.encode([0xff, 0xfe, 0xfd]), "job").unwrap_err();
        assert!(matches!(err, PaperboyError::DecodeError(msg) if msg.contains("UTF-8")));
    }

    #[test]
    fn reports_must_be_an_array_of_objects() {
        let err = decode_reports(&encode(r#"{"id": 1}"#)).unwrap_err();
        assert!(matches!(err, PaperboyError::DecodeError(msg) if msg.contains("array")));

        let err = decode_reports(&encode("[1, 2]")).unwrap_err();
        assert!(
            matches!(err, PaperboyError::ValidationError(msg) if msg.contains("position 0"))
        );
    }

    #[test]
    fn wrongly_typed_job_field_names_job_and_field() {
        let err = decode_job(&encode(r#"{"id": 42, "owner": 5}"#)).unwrap_err();
        match err {
            PaperboyError::ValidationError(msg) => {
                assert!(msg.starts_with("job 42: owner:"), "got: {msg}");
            }
            other => panic!("Expected ValidationError, got: {:?}", other),
        }

        let err = decode_job(&encode(r#"{"id": "42", "priority": -1}"#)).unwrap_err();
        assert!(
            matches!(err, PaperboyError::ValidationError(msg) if msg.starts_with("job 42: priority:"))
        );
    }

    #[test]
    fn malformed_job_id_is_validation_error() {
        for doc in [r#"{"id": true}"#, r#"{"id": 4.5}"#, r#"{"id": [1]}"#] {
            let err = decode_job(&encode(doc)).unwrap_err();
            assert!(
                matches!(&err, PaperboyError::ValidationError(msg) if msg.contains("'id'")),
                "{doc}: {err:?}"
            );
        }

        let (raw, _) = decode_job(&encode(r#"{"id": 18446744073709551615}"#)).unwrap();
        assert_eq!(raw.id, Some(RawId::UInt(u64::MAX)));
    }

    #[test]
    fn wrongly_typed_report_field_names_report() {
        let err = decode_reports(&encode(r#"[{"id": 7, "job": true}]"#)).unwrap_err();
        assert!(
            matches!(err, PaperboyError::ValidationError(msg) if msg.starts_with("report 7: job:"))
        );

        let err = decode_reports(&encode(r#"[{"id": 1}, {"parameters": "x", "job": []}]"#))
            .unwrap_err();
        assert!(
            matches!(err, PaperboyError::ValidationError(msg) if msg.starts_with("report at position 1:"))
        );

        let err = decode_reports(&encode(r#"[{"id": false}]"#)).unwrap_err();
        assert!(
            matches!(err, PaperboyError::ValidationError(msg) if msg.contains("position 0") && msg.contains("'id'"))
        );
    }

    #[test]
    fn empty_report_list_decodes() {
        assert!(decode_reports(&encode("[]")).unwrap().is_empty());
    }
}
