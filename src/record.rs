//! The check-in record written for every accepted submission.

use serde::Serialize;
use serde_json::Value;

/// One check-in event.
///
/// Field names on the wire are the ones the front end and the data file have
/// always used (`codigo`, `nombre`, `fechaISO`, `fechaLocal`). Records already
/// on disk are not read back into this type: the store keeps them as raw JSON
/// values, whatever shape they have.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "codigo")]
    pub code: String,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "fechaISO")]
    pub timestamp_utc: String,

    #[serde(rename = "fechaLocal")]
    pub timestamp_local: String,
}

impl Record {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        timestamp_utc: impl Into<String>,
        timestamp_local: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            timestamp_utc: timestamp_utc.into(),
            timestamp_local: timestamp_local.into(),
        }
    }

    /// The record as a JSON object, keys in wire order.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_names_in_order() {
        let record = Record::new("20231234", "Ana María", "2026-10-19T12:00:00.000Z", "19/10/2026, 07:00:00");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"codigo":"20231234","nombre":"Ana María","fechaISO":"2026-10-19T12:00:00.000Z","fechaLocal":"19/10/2026, 07:00:00"}"#
        );
    }

    #[test]
    fn value_form_keeps_wire_order() {
        let record = Record::new("1234", "Luis", "2026-10-19T12:00:00.000Z", "19/10/2026, 07:00:00");
        let value = record.to_value().unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["codigo", "nombre", "fechaISO", "fechaLocal"]);
    }
}
