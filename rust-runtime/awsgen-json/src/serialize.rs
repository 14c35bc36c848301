/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Streaming JSON writers.
//!
//! The writers append directly to a `String`; object and array writers insert separators and
//! close their brackets in `finish`.

use crate::escape::escape_string;
use awsgen_types::date_time::{DateTimeFormatError, Format};
use awsgen_types::{base64, Blob, DateTime, Document, Number};

/// Writes a single JSON value.
#[derive(Debug)]
pub struct JsonValueWriter<'a> {
    output: &'a mut String,
}

impl<'a> JsonValueWriter<'a> {
    /// Creates a value writer appending to `output`.
    pub fn new(output: &'a mut String) -> Self {
        JsonValueWriter { output }
    }

    /// Writes a null value.
    pub fn null(self) {
        self.output.push_str("null");
    }

    /// Writes the boolean `value`.
    pub fn boolean(self, value: bool) {
        self.output.push_str(if value { "true" } else { "false" });
    }

    /// Writes a string `value`, escaping it.
    pub fn string(self, value: &str) {
        self.output.push('"');
        self.output.push_str(&escape_string(value));
        self.output.push('"');
    }

    /// Writes a number `value`. Non-finite floats are written as strings.
    pub fn number(self, value: Number) {
        match value {
            Number::Float(v) if !v.is_finite() => self.string(&value.to_string()),
            _ => self.output.push_str(&value.to_string()),
        }
    }

    /// Writes a blob as a base64 encoded string.
    pub fn blob(self, value: &Blob) {
        self.string(&base64::encode(value.as_ref()));
    }

    /// Writes a timestamp in the given `format`. Epoch seconds are written as a number.
    pub fn date_time(self, value: &DateTime, format: Format) -> Result<(), DateTimeFormatError> {
        let formatted = value.fmt(format)?;
        match format {
            Format::EpochSeconds => self.output.push_str(&formatted),
            _ => self.string(&formatted),
        }
        Ok(())
    }

    /// Writes an arbitrary document.
    pub fn document(self, value: &Document) {
        match value {
            Document::Array(values) => {
                let mut array = self.start_array();
                for value in values {
                    array.value().document(value);
                }
                array.finish();
            }
            Document::Bool(value) => self.boolean(*value),
            Document::Null => self.null(),
            Document::Number(value) => self.number(*value),
            Document::Object(values) => {
                let mut object = self.start_object();
                for (key, value) in values {
                    object.key(key).document(value);
                }
                object.finish();
            }
            Document::String(value) => self.string(value),
        }
    }

    /// Starts an array.
    pub fn start_array(self) -> JsonArrayWriter<'a> {
        JsonArrayWriter::new(self.output)
    }

    /// Starts an object.
    pub fn start_object(self) -> JsonObjectWriter<'a> {
        JsonObjectWriter::new(self.output)
    }
}

/// Writes the members of a JSON object.
#[derive(Debug)]
pub struct JsonObjectWriter<'a> {
    output: &'a mut String,
    started: bool,
}

impl<'a> JsonObjectWriter<'a> {
    /// Opens an object on `output`.
    pub fn new(output: &'a mut String) -> Self {
        output.push('{');
        Self {
            output,
            started: false,
        }
    }

    /// Writes the key of the next member and returns a writer for its value.
    pub fn key(&mut self, key: &str) -> JsonValueWriter<'_> {
        if self.started {
            self.output.push(',');
        }
        self.started = true;

        self.output.push('"');
        self.output.push_str(&escape_string(key));
        self.output.push_str("\":");

        JsonValueWriter::new(self.output)
    }

    /// Closes the object.
    pub fn finish(self) {
        self.output.push('}');
    }
}

/// Writes the elements of a JSON array.
#[derive(Debug)]
pub struct JsonArrayWriter<'a> {
    output: &'a mut String,
    started: bool,
}

impl<'a> JsonArrayWriter<'a> {
    /// Opens an array on `output`.
    pub fn new(output: &'a mut String) -> Self {
        output.push('[');
        Self {
            output,
            started: false,
        }
    }

    /// Returns a writer for the next element.
    pub fn value(&mut self) -> JsonValueWriter<'_> {
        if self.started {
            self.output.push(',');
        }
        self.started = true;
        JsonValueWriter::new(self.output)
    }

    /// Closes the array.
    pub fn finish(self) {
        self.output.push(']');
    }
}
