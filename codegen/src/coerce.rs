/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Type-directed conversion of loosely-typed documents into typed values.
//!
//! The same walk serves three inputs: raw caller input keyed by member name, decoded JSON
//! payloads and decoded XML payloads (both keyed by wire name). Only the leaf rules and the
//! shape of lists and maps differ between them.

use crate::error::{DeserializeError, ValidationError};
use crate::plan::{ListPlan, MapPlan, StructurePlan, TargetPlan};
use crate::model::ScalarKind;
use crate::value::{StructValue, Value};
use awsgen_http::content::ContentSource;
use awsgen_types::date_time::{DateTimeParseError, Format};
use awsgen_types::{Blob, DateTime, Document};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    /// Caller input: member names, blobs as raw text
    Create,
    /// Decoded JSON payloads
    Json,
    /// Decoded XML payloads: list and map wrappers, everything is text
    Xml,
}

#[derive(Debug)]
pub(crate) enum CoerceError {
    Type {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    Timestamp {
        path: String,
        source: DateTimeParseError,
    },
    Base64 {
        path: String,
    },
}

impl From<CoerceError> for ValidationError {
    fn from(err: CoerceError) -> Self {
        match err {
            CoerceError::Type {
                path,
                expected,
                found,
            } => ValidationError::InvalidType {
                path,
                expected,
                found,
            },
            CoerceError::Timestamp { path, .. } => ValidationError::InvalidType {
                path,
                expected: "timestamp",
                found: "string",
            },
            CoerceError::Base64 { path } => ValidationError::InvalidType {
                path,
                expected: "blob",
                found: "string",
            },
        }
    }
}

impl From<CoerceError> for DeserializeError {
    fn from(err: CoerceError) -> Self {
        match err {
            CoerceError::Type {
                path,
                expected,
                found,
            } => DeserializeError::Coercion {
                path,
                expected,
                found,
            },
            CoerceError::Timestamp { path, source } => {
                DeserializeError::Timestamp { path, source }
            }
            CoerceError::Base64 { path } => DeserializeError::Base64 { path },
        }
    }
}

fn mismatch(path: &str, expected: &'static str, found: &Document) -> CoerceError {
    CoerceError::Type {
        path: path.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// Builds a structure value from `doc`. Members missing from `doc` stay null.
pub(crate) fn coerce_structure(
    plan: &StructurePlan,
    doc: &Document,
    dialect: Dialect,
    path: &str,
) -> Result<StructValue, CoerceError> {
    let mut out = StructValue::new(plan.shape.clone());
    let fields = match doc {
        Document::Object(fields) => fields,
        // `<Owner/>`, possibly with whitespace inside
        Document::String(s) if dialect == Dialect::Xml && s.trim().is_empty() => return Ok(out),
        other => return Err(mismatch(path, "structure", other)),
    };
    for member in &plan.members {
        let key = match dialect {
            Dialect::Create => &member.name,
            Dialect::Json | Dialect::Xml if member.location.is_body() => &member.wire_name,
            _ => continue,
        };
        let Some(field) = fields.get(key) else {
            continue;
        };
        if let Some(value) = coerce(&member.target, field, dialect, &join(path, &member.name))? {
            out.set(member.name.clone(), value);
        }
    }
    if dialect == Dialect::Create {
        for key in fields.keys().filter(|k| plan.member(k).is_none()) {
            tracing::debug!(shape = %plan.shape, field = %key, "ignoring unknown input field");
        }
    }
    Ok(out)
}

/// Converts `doc` into a value of `target`. Null converts to `None`.
pub(crate) fn coerce(
    target: &TargetPlan,
    doc: &Document,
    dialect: Dialect,
    path: &str,
) -> Result<Option<Value>, CoerceError> {
    if doc.is_null() {
        return Ok(None);
    }
    let value = match target {
        TargetPlan::Scalar {
            kind,
            timestamp_format,
            streaming,
        } => coerce_scalar(*kind, *timestamp_format, *streaming, doc, dialect, path)?,
        TargetPlan::Enum(_) => match doc {
            Document::String(s) => Value::String(s.clone()),
            other => return Err(mismatch(path, "enum string", other)),
        },
        TargetPlan::Structure(plan) => {
            Value::Structure(coerce_structure(plan, doc, dialect, path)?)
        }
        TargetPlan::List(list) => Value::List(coerce_list(list, doc, dialect, path)?),
        TargetPlan::Map(map) => Value::Map(coerce_map(map, doc, dialect, path)?),
    };
    Ok(Some(value))
}

fn coerce_scalar(
    kind: ScalarKind,
    timestamp_format: Option<Format>,
    streaming: bool,
    doc: &Document,
    dialect: Dialect,
    path: &str,
) -> Result<Value, CoerceError> {
    let expected = kind.name();
    Ok(match (kind, doc) {
        (ScalarKind::String, Document::String(s)) => Value::String(s.clone()),
        // Some services model numeric fields as strings.
        (ScalarKind::String, Document::Number(n)) => Value::String(n.to_string()),
        (ScalarKind::String, Document::Bool(b)) => Value::String(b.to_string()),

        (ScalarKind::Boolean, Document::Bool(b)) => Value::Boolean(*b),
        (ScalarKind::Boolean, Document::String(s)) => match s.as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => return Err(mismatch(path, expected, doc)),
        },

        (ScalarKind::Integer, Document::Number(n)) => match n.to_i64() {
            Some(i) => Value::Integer(i),
            None => return Err(mismatch(path, expected, doc)),
        },
        (ScalarKind::Integer, Document::String(s)) => match s.trim().parse() {
            Ok(i) => Value::Integer(i),
            Err(_) => return Err(mismatch(path, expected, doc)),
        },

        (ScalarKind::Float, Document::Number(n)) => Value::Float(n.to_f64_lossy()),
        (ScalarKind::Float, Document::String(s)) => match s.trim() {
            "NaN" => Value::Float(f64::NAN),
            "Infinity" => Value::Float(f64::INFINITY),
            "-Infinity" => Value::Float(f64::NEG_INFINITY),
            s => match s.parse() {
                Ok(f) => Value::Float(f),
                Err(_) => return Err(mismatch(path, expected, doc)),
            },
        },

        (ScalarKind::Timestamp, Document::Number(n)) => {
            Value::Timestamp(DateTime::from_secs_f64(n.to_f64_lossy()))
        }
        (ScalarKind::Timestamp, Document::String(s)) => {
            let parsed = match timestamp_format {
                Some(format) => {
                    DateTime::from_str(s, format).or_else(|_| DateTime::from_str_any(s))
                }
                None => DateTime::from_str_any(s),
            };
            match parsed {
                Ok(date_time) => Value::Timestamp(date_time),
                Err(source) => {
                    return Err(CoerceError::Timestamp {
                        path: path.to_string(),
                        source,
                    })
                }
            }
        }

        (ScalarKind::Blob, Document::String(s)) => match dialect {
            Dialect::Create if streaming => {
                Value::Stream(ContentSource::from_bytes(s.as_bytes().to_vec()))
            }
            Dialect::Create => Value::Blob(Blob::new(s.as_bytes())),
            Dialect::Json | Dialect::Xml => match awsgen_types::base64::decode(s) {
                Ok(bytes) => Value::Blob(Blob::new(bytes)),
                Err(_) => {
                    return Err(CoerceError::Base64 {
                        path: path.to_string(),
                    })
                }
            },
        },

        (_, other) => return Err(mismatch(path, expected, other)),
    })
}

fn coerce_list(
    plan: &ListPlan,
    doc: &Document,
    dialect: Dialect,
    path: &str,
) -> Result<Vec<Value>, CoerceError> {
    let items: &[Document] = match dialect {
        Dialect::Create | Dialect::Json => match doc {
            Document::Array(items) => items,
            other => return Err(mismatch(path, "list", other)),
        },
        Dialect::Xml => {
            let entries = if plan.flattened {
                Some(doc)
            } else {
                match doc {
                    Document::Object(wrapper) => {
                        wrapper.get(plan.member_name.as_deref().unwrap_or("member"))
                    }
                    Document::String(s) if s.trim().is_empty() => None,
                    other => return Err(mismatch(path, "list", other)),
                }
            };
            match entries {
                None => &[],
                Some(Document::Array(items)) => items,
                // A single element is a one-element list.
                Some(single) => std::slice::from_ref(single),
            }
        }
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(value) = coerce(&plan.member, item, dialect, &format!("{}[{}]", path, i))? {
            out.push(value);
        }
    }
    Ok(out)
}

fn coerce_map(
    plan: &MapPlan,
    doc: &Document,
    dialect: Dialect,
    path: &str,
) -> Result<IndexMap<String, Value>, CoerceError> {
    let mut out = IndexMap::new();
    match dialect {
        Dialect::Create | Dialect::Json => {
            let Document::Object(fields) = doc else {
                return Err(mismatch(path, "map", doc));
            };
            for (key, field) in fields {
                if let Some(value) = coerce(&plan.value, field, dialect, &join(path, key))? {
                    out.insert(key.clone(), value);
                }
            }
        }
        Dialect::Xml => {
            let entries = if plan.flattened {
                Some(doc)
            } else {
                match doc {
                    Document::Object(wrapper) => wrapper.get("entry"),
                    Document::String(s) if s.trim().is_empty() => None,
                    other => return Err(mismatch(path, "map", other)),
                }
            };
            let entries = match entries {
                None => &[][..],
                Some(Document::Array(items)) => items.as_slice(),
                Some(single) => std::slice::from_ref(single),
            };
            for entry in entries {
                let key = match entry.get(plan.key_name()) {
                    Some(Document::String(key)) => key,
                    Some(other) => return Err(mismatch(path, "map key", other)),
                    None => return Err(mismatch(path, "map entry", entry)),
                };
                let field = entry.get(plan.value_name()).unwrap_or(&Document::Null);
                if let Some(value) = coerce(&plan.value, field, dialect, &join(path, key))? {
                    out.insert(key.clone(), value);
                }
            }
        }
    }
    Ok(out)
}
