/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Typed values of compiled shapes.

use awsgen_http::content::ContentSource;
use awsgen_types::{Blob, DateTime, Document};
use indexmap::IndexMap;

/// A value of a member, list entry or map value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string or enum value
    String(String),
    /// A boolean
    Boolean(bool),
    /// Any integral number
    Integer(i64),
    /// Any floating point number
    Float(f64),
    /// A point in time
    Timestamp(DateTime),
    /// Binary content held in memory
    Blob(Blob),
    /// Streamed binary content
    Stream(ContentSource),
    /// A list, in order
    List(Vec<Value>),
    /// A map, in insertion order
    Map(IndexMap<String, Value>),
    /// A nested structure
    Structure(StructValue),
}

impl Value {
    /// Short name of the value kind, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Timestamp(_) => "timestamp",
            Value::Blob(_) => "blob",
            Value::Stream(_) => "stream",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Structure(_) => "structure",
        }
    }

    /// Returns the string, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the entries, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the structure, if this is one.
    pub fn as_structure(&self) -> Option<&StructValue> {
        match self {
            Value::Structure(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<DateTime> for Value {
    fn from(value: DateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Blob> for Value {
    fn from(value: Blob) -> Self {
        Value::Blob(value)
    }
}

impl From<ContentSource> for Value {
    fn from(value: ContentSource) -> Self {
        Value::Stream(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Structure(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A value of a structure shape. Absent members are null.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    shape: String,
    fields: IndexMap<String, Value>,
}

impl StructValue {
    /// Creates an empty value of structure `shape`.
    pub fn new(shape: impl Into<String>) -> Self {
        StructValue {
            shape: shape.into(),
            fields: IndexMap::new(),
        }
    }

    /// Name of the structure shape.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Sets member `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Sets member `name` and returns the value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Value of member `name`, or `None` if it is null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Value of string member `name`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Clears member `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// Members with a value, in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if every member is null.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Input accepted by a client method: an already-typed value or a loosely-typed document
/// keyed by member name.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeInput {
    /// A value built for the input shape
    Typed(StructValue),
    /// A document converted member by member
    Raw(Document),
}

impl From<StructValue> for ShapeInput {
    fn from(value: StructValue) -> Self {
        ShapeInput::Typed(value)
    }
}

impl From<Document> for ShapeInput {
    fn from(value: Document) -> Self {
        ShapeInput::Raw(value)
    }
}
