/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::Number;
use indexmap::IndexMap;

/// Document Type
///
/// Document types represent protocol-agnostic open content that is accessed like JSON data.
/// Both decoded response payloads (JSON or XML) and loosely-typed caller input are carried as
/// documents. Objects keep insertion order so that positional wire encodings (such as the
/// 1-based indices of the query protocol) follow the order the caller provided.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// JSON object
    Object(IndexMap<String, Document>),
    /// JSON array
    Array(Vec<Document>),
    /// JSON number
    Number(Number),
    /// JSON string
    String(String),
    /// JSON boolean
    Bool(bool),
    /// JSON null
    Null,
}

impl Document {
    /// Returns the inner string if this is a [`Document::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the inner map if this is a [`Document::Object`].
    pub fn as_object(&self) -> Option<&IndexMap<String, Document>> {
        match self {
            Document::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the inner elements if this is a [`Document::Array`].
    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Document::Array(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true for [`Document::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Looks up `key` when this is an object.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Object(_) => "object",
            Document::Array(_) => "array",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Bool(_) => "boolean",
            Document::Null => "null",
        }
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::String(value)
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<Vec<Document>> for Document {
    fn from(values: Vec<Document>) -> Self {
        Document::Array(values)
    }
}

impl From<IndexMap<String, Document>> for Document {
    fn from(values: IndexMap<String, Document>) -> Self {
        Document::Object(values)
    }
}

impl From<u64> for Document {
    fn from(value: u64) -> Self {
        Document::Number(Number::PosInt(value))
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Number(value.into())
    }
}

impl From<i32> for Document {
    fn from(value: i32) -> Self {
        Document::Number((value as i64).into())
    }
}

impl From<f64> for Document {
    fn from(value: f64) -> Self {
        Document::Number(Number::Float(value))
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<Document>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
