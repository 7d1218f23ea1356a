//! Turns a submitted request body into a [`Record`].
//!
//! The body is untrusted: any field may be missing or of the wrong JSON type.
//! Fields are coerced to strings first and only then checked, so a numeric
//! `codigo` such as `20231234` is as good as the string `"20231234"`.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;
use crate::record::Record;

/// Minimum number of digits in a student code.
pub const MIN_CODE_DIGITS: usize = 4;

/// Minimum length of a trimmed student name, in characters.
pub const MIN_NAME_CHARS: usize = 3;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// The body is not a JSON object.
    #[error("malformed submission body")]
    Malformed,

    /// The body parsed but the code or name fails the acceptance rules.
    #[error("submission rejected: code must be 4+ digits, name 3+ characters")]
    Rejected,
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Malformed => ApiError::MalformedBody,
            ValidationError::Rejected => ApiError::InvalidRecord,
        }
    }
}

/// Raw submission as sent by the form. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct Submission {
    codigo: Option<Value>,
    nombre: Option<Value>,
    #[serde(rename = "fechaISO")]
    fecha_iso: Option<Value>,
    #[serde(rename = "fechaLocal")]
    fecha_local: Option<Value>,
}

/// Validates `body` against the current instant.
pub fn validate(body: &[u8]) -> Result<Record, ValidationError> {
    validate_at(body, Utc::now())
}

/// Validates `body`, filling absent timestamps from `now`.
pub fn validate_at(body: &[u8], now: DateTime<Utc>) -> Result<Record, ValidationError> {
    let submission = parse(body)?;

    let code = coerce(submission.codigo.as_ref());
    let name = coerce(submission.nombre.as_ref());
    if !is_valid_code(&code) || name.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::Rejected);
    }

    let timestamp_utc = non_empty(coerce(submission.fecha_iso.as_ref()))
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
    let timestamp_local = non_empty(coerce(submission.fecha_local.as_ref()))
        .unwrap_or_else(|| format_local(now));

    Ok(Record::new(code, name, timestamp_utc, timestamp_local))
}

fn parse(body: &[u8]) -> Result<Submission, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Submission::default());
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::Malformed)?;
    if !value.is_object() {
        return Err(ValidationError::Malformed);
    }
    serde_json::from_value(value).map_err(|_| ValidationError::Malformed)
}

/// String → trimmed; number and bool → JSON text; anything else → `""`.
fn coerce(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => trim(s).to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Strips whitespace and byte-order marks, which spreadsheet pastes carry.
fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// `^\d{4,}$` over ASCII digits.
fn is_valid_code(code: &str) -> bool {
    code.len() >= MIN_CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

fn format_local(now: DateTime<Utc>) -> String {
    now.with_timezone(&Local).format("%-d/%-m/%Y, %H:%M:%S").to_string()
}
