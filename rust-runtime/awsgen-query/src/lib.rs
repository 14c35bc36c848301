/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Abstractions for the awsQuery and ec2Query protocols.
//!
//! Query request bodies are `application/x-www-form-urlencoded`. Nested values are addressed by
//! dotted paths where list and map entries carry 1-based positional indices, for example
//! `Attribute.1.Name=env&Attribute.1.Value=prod`.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

use awsgen_types::date_time::{DateTimeFormatError, Format};
use awsgen_types::{DateTime, Number};
use std::borrow::Cow;

/// Form-encodes `value`. Spaces become `+`.
pub fn fmt_string<T: AsRef<str>>(value: T) -> String {
    urlencoding::encode(value.as_ref()).replace("%20", "+")
}

/// Top-level writer of a query request body.
#[derive(Debug)]
pub struct QueryWriter<'a> {
    output: &'a mut String,
}

impl<'a> QueryWriter<'a> {
    /// Starts a body for `action` at API `version`. These are always the leading fields.
    pub fn new(output: &'a mut String, action: &str, version: &str) -> Self {
        output.push_str("Action=");
        output.push_str(&fmt_string(action));
        output.push_str("&Version=");
        output.push_str(&fmt_string(version));
        QueryWriter { output }
    }

    /// Returns a writer for the field named `prefix`.
    pub fn prefix(&mut self, prefix: &str) -> QueryValueWriter<'_> {
        QueryValueWriter::new(self.output, Cow::Owned(prefix.to_string()))
    }

    /// Finishes the body.
    pub fn finish(self) {
        // Calling this drops self
    }
}

/// Writes a single value, or the nested fields of a structure, at a given path.
#[derive(Debug)]
pub struct QueryValueWriter<'a> {
    output: &'a mut String,
    prefix: Cow<'a, str>,
}

impl<'a> QueryValueWriter<'a> {
    /// Creates a writer for the field at `prefix`.
    pub fn new(output: &'a mut String, prefix: Cow<'a, str>) -> Self {
        QueryValueWriter { output, prefix }
    }

    /// Returns a writer for the nested field `prefix` of this structure.
    pub fn prefix(&mut self, prefix: &str) -> QueryValueWriter<'_> {
        QueryValueWriter::new(
            self.output,
            Cow::Owned(format!("{}.{}", self.prefix, prefix)),
        )
    }

    /// Starts a list.
    ///
    /// A flattened list indexes entries directly on the field (`Name.1`). Otherwise entries go
    /// under `member_override`, or `member` when unset (`Name.member.1`).
    pub fn start_list(self, flat: bool, member_override: Option<&'a str>) -> QueryListWriter<'a> {
        QueryListWriter::new(self.output, self.prefix, flat, member_override)
    }

    /// Starts a map.
    ///
    /// A flattened map indexes entries directly on the field (`Name.1.Key`). Otherwise entries
    /// go under `entry` (`Name.entry.1.key`).
    pub fn start_map(
        self,
        flat: bool,
        key_name: &'a str,
        value_name: &'a str,
    ) -> QueryMapWriter<'a> {
        QueryMapWriter::new(self.output, self.prefix, flat, key_name, value_name)
    }

    /// Writes a string value.
    pub fn string(mut self, value: &str) {
        self.write_param_name();
        self.output.push_str(&fmt_string(value));
    }

    /// Writes a boolean value.
    pub fn boolean(self, value: bool) {
        self.string(if value { "true" } else { "false" });
    }

    /// Writes a number value.
    pub fn number(self, value: Number) {
        match value {
            Number::PosInt(value) => self.string(&value.to_string()),
            Number::NegInt(value) => self.string(&value.to_string()),
            Number::Float(value) => self.float(value),
        }
    }

    /// Writes a timestamp in the given `format`.
    pub fn date_time(self, value: &DateTime, format: Format) -> Result<(), DateTimeFormatError> {
        let formatted = value.fmt(format)?;
        self.string(&formatted);
        Ok(())
    }

    fn float(self, value: f64) {
        if value.is_nan() {
            self.string("NaN")
        } else if value.is_infinite() {
            self.string(if value > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            self.string(&value.to_string())
        }
    }

    fn write_param_name(&mut self) {
        self.output.push('&');
        self.output.push_str(&self.prefix);
        self.output.push('=');
    }
}

/// Writes list entries with 1-based indices.
#[derive(Debug)]
pub struct QueryListWriter<'a> {
    output: &'a mut String,
    prefix: Cow<'a, str>,
    flat: bool,
    member_override: Option<&'a str>,
    next_index: usize,
}

impl<'a> QueryListWriter<'a> {
    fn new(
        output: &'a mut String,
        prefix: Cow<'a, str>,
        flat: bool,
        member_override: Option<&'a str>,
    ) -> Self {
        QueryListWriter {
            output,
            prefix,
            flat,
            member_override,
            next_index: 1,
        }
    }

    /// Returns a writer for the next entry.
    pub fn entry(&mut self) -> QueryValueWriter<'_> {
        let prefix = if self.flat {
            format!("{}.{}", self.prefix, self.next_index)
        } else {
            format!(
                "{}.{}.{}",
                self.prefix,
                self.member_override.unwrap_or("member"),
                self.next_index
            )
        };
        self.next_index += 1;
        QueryValueWriter::new(self.output, Cow::Owned(prefix))
    }

    /// Finishes the list. An empty list contributes no fields.
    pub fn finish(self) {
        // Calling this drops self
    }
}

/// Writes map entries with 1-based indices.
#[derive(Debug)]
pub struct QueryMapWriter<'a> {
    output: &'a mut String,
    prefix: Cow<'a, str>,
    flat: bool,
    key_name: &'a str,
    value_name: &'a str,
    next_index: usize,
}

impl<'a> QueryMapWriter<'a> {
    fn new(
        output: &'a mut String,
        prefix: Cow<'a, str>,
        flat: bool,
        key_name: &'a str,
        value_name: &'a str,
    ) -> Self {
        QueryMapWriter {
            output,
            prefix,
            flat,
            key_name,
            value_name,
            next_index: 1,
        }
    }

    /// Writes the key of the next entry and returns a writer for its value.
    pub fn entry(&mut self, key: &str) -> QueryValueWriter<'_> {
        let entry = if self.flat {
            format!("{}.{}", self.prefix, self.next_index)
        } else {
            format!("{}.entry.{}", self.prefix, self.next_index)
        };
        self.next_index += 1;
        self.output.push('&');
        self.output.push_str(&entry);
        self.output.push('.');
        self.output.push_str(self.key_name);
        self.output.push('=');
        self.output.push_str(&fmt_string(key));
        QueryValueWriter::new(
            self.output,
            Cow::Owned(format!("{}.{}", entry, self.value_name)),
        )
    }

    /// Finishes the map.
    pub fn finish(self) {
        // Calling this drops self
    }
}
