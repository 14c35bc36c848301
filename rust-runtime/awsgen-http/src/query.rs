/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Formatting values into URI query strings.

use awsgen_types::date_time::{DateTimeFormatError, Format};
use awsgen_types::DateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes a query key or value.
pub fn fmt_string<T: AsRef<str>>(value: T) -> String {
    utf8_percent_encode(value.as_ref(), QUERY_SET).to_string()
}

/// Formats a timestamp as a query value.
pub fn fmt_timestamp(value: &DateTime, format: Format) -> Result<String, DateTimeFormatError> {
    Ok(fmt_string(value.fmt(format)?))
}

/// Appends `key=value` pairs to a URI, respecting a query string already present.
#[derive(Debug)]
pub struct QueryWriter {
    base: String,
    separator: char,
}

impl QueryWriter {
    /// Starts from `uri`, which may already carry a query suffix such as `?acl`.
    pub fn new(uri: impl Into<String>) -> Self {
        let base = uri.into();
        let separator = if base.contains('?') { '&' } else { '?' };
        QueryWriter { base, separator }
    }

    /// Appends an encoded pair.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.base.push(self.separator);
        self.base.push_str(&fmt_string(key));
        self.base.push('=');
        self.base.push_str(&fmt_string(value));
        self.separator = '&';
    }

    /// Returns the finished URI.
    pub fn build(self) -> String {
        self.base
    }
}
