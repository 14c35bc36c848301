/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Decoding of JSON response payloads into [`Document`]s.

use awsgen_types::{Document, Number};
use indexmap::IndexMap;

/// Failure to decode a JSON payload.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse JSON payload")]
pub struct JsonDecodeError {
    #[from]
    source: serde_json::Error,
}

/// Decodes `input` into a [`Document`].
///
/// An empty (or whitespace-only) payload decodes to an empty object, which is how services
/// answer operations that return no members.
pub fn decode(input: &[u8]) -> Result<Document, JsonDecodeError> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::Object(IndexMap::new()));
    }
    let value: serde_json::Value = serde_json::from_slice(input)?;
    Ok(to_document(value))
}

fn to_document(value: serde_json::Value) -> Document {
    use serde_json::Value;
    match value {
        Value::Null => Document::Null,
        Value::Bool(value) => Document::Bool(value),
        Value::Number(value) => Document::Number(to_number(&value)),
        Value::String(value) => Document::String(value),
        Value::Array(values) => Document::Array(values.into_iter().map(to_document).collect()),
        Value::Object(values) => Document::Object(
            values
                .into_iter()
                .map(|(key, value)| (key, to_document(value)))
                .collect(),
        ),
    }
}

fn to_number(value: &serde_json::Number) -> Number {
    if let Some(value) = value.as_u64() {
        Number::PosInt(value)
    } else if let Some(value) = value.as_i64() {
        Number::NegInt(value)
    } else {
        Number::Float(value.as_f64().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod test {
    use super::decode;
    use awsgen_types::{Document, Number};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_payload_is_an_empty_object() {
        assert_eq!(decode(b"").unwrap(), Document::Object(Default::default()));
        assert_eq!(decode(b" \n").unwrap(), Document::Object(Default::default()));
    }

    #[test]
    fn decodes_nested_values_in_order() {
        let doc = decode(br#"{"TableNames":["b","a"],"Count":-2,"Ratio":0.5,"Next":null}"#)
            .expect("valid json");
        let object = doc.as_object().unwrap();
        assert_eq!(
            object.keys().collect::<Vec<_>>(),
            vec!["TableNames", "Count", "Ratio", "Next"]
        );
        assert_eq!(
            object["TableNames"],
            Document::Array(vec!["b".into(), "a".into()])
        );
        assert_eq!(object["Count"], Document::Number(Number::NegInt(-2)));
        assert_eq!(object["Ratio"], Document::Number(Number::Float(0.5)));
        assert!(object["Next"].is_null());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        decode(b"{\"unterminated\": ").expect_err("invalid json");
    }
}
