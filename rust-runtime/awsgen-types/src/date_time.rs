/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! DateTime type for representing Smithy timestamps.

use std::error::Error as StdError;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// DateTime in time.
///
/// DateTime in time represented as seconds and sub-second nanos since
/// the Unix epoch (January 1, 1970 at midnight UTC/GMT).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct DateTime {
    seconds: i64,
    subsecond_nanos: u32,
}

/// Formats for representing a `DateTime` on the wire.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Format {
    /// RFC-3339 Date Time. If the date time has an offset other than Z, then the offset will be
    /// used to normalize the date time to UTC.
    DateTime,
    /// Date format used by the HTTP `Date` header, specified in RFC-7231.
    HttpDate,
    /// Number of seconds since the Unix epoch formatted as a floating point.
    EpochSeconds,
}

impl DateTime {
    /// Creates a `DateTime` from a number of seconds since the Unix epoch.
    pub fn from_secs(epoch_seconds: i64) -> Self {
        DateTime {
            seconds: epoch_seconds,
            subsecond_nanos: 0,
        }
    }

    /// Creates a `DateTime` from a number of seconds and sub-second nanos since the Unix epoch.
    pub fn from_secs_and_nanos(seconds: i64, subsecond_nanos: u32) -> Self {
        if subsecond_nanos >= NANOS_PER_SECOND {
            DateTime {
                seconds: seconds + (subsecond_nanos / NANOS_PER_SECOND) as i64,
                subsecond_nanos: subsecond_nanos % NANOS_PER_SECOND,
            }
        } else {
            DateTime {
                seconds,
                subsecond_nanos,
            }
        }
    }

    /// Creates a `DateTime` from an `f64` representing the number of seconds since the Unix epoch.
    pub fn from_secs_f64(epoch_seconds: f64) -> Self {
        let seconds = epoch_seconds.floor() as i64;
        let rem = epoch_seconds - epoch_seconds.floor();
        DateTime::from_secs_and_nanos(seconds, (rem * NANOS_PER_SECOND as f64).round() as u32)
    }

    /// Returns the number of whole seconds since the Unix epoch.
    pub fn secs(&self) -> i64 {
        self.seconds
    }

    /// Returns the sub-second nanos component.
    pub fn subsec_nanos(&self) -> u32 {
        self.subsecond_nanos
    }

    /// Returns the epoch seconds component, including sub-second precision as a fraction.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.subsecond_nanos as f64 / NANOS_PER_SECOND as f64
    }

    /// Returns true if sub-second nanos is greater than zero.
    pub fn has_subsec_nanos(&self) -> bool {
        self.subsecond_nanos != 0
    }

    /// Parses a `DateTime` from a string using the given `format`.
    pub fn from_str(s: &str, format: Format) -> Result<Self, DateTimeParseError> {
        match format {
            Format::DateTime => {
                let parsed = OffsetDateTime::parse(s.trim(), &Rfc3339)
                    .map_err(|err| DateTimeParseError::new(format, err.to_string()))?;
                Ok(Self::from_offset_date_time(parsed))
            }
            Format::HttpDate => {
                let description = format_description!(
                    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
                );
                let parsed = PrimitiveDateTime::parse(s.trim(), description)
                    .map_err(|err| DateTimeParseError::new(format, err.to_string()))?;
                Ok(Self::from_offset_date_time(parsed.assume_utc()))
            }
            Format::EpochSeconds => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Self::from_secs_f64)
                .ok_or_else(|| DateTimeParseError::new(format, "not a number of seconds")),
        }
    }

    /// Parses a timestamp without knowing its wire format ahead of time.
    ///
    /// Tries RFC-3339, then HTTP-date, then epoch seconds.
    pub fn from_str_any(s: &str) -> Result<Self, DateTimeParseError> {
        Self::from_str(s, Format::DateTime)
            .or_else(|_| Self::from_str(s, Format::HttpDate))
            .or_else(|_| Self::from_str(s, Format::EpochSeconds))
    }

    /// Formats the `DateTime` to a string using the given `format`.
    ///
    /// Returns an error if the given `DateTime` cannot be represented by the desired format.
    pub fn fmt(&self, format: Format) -> Result<String, DateTimeFormatError> {
        match format {
            Format::EpochSeconds => {
                if self.subsecond_nanos == 0 {
                    Ok(format!("{}", self.seconds))
                } else {
                    let fraction = format!("{:0>9}", self.subsecond_nanos);
                    Ok(format!("{}.{}", self.seconds, fraction.trim_end_matches('0')))
                }
            }
            Format::DateTime => {
                let date_time = self.to_offset_date_time()?;
                let description =
                    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
                let mut out = date_time
                    .format(description)
                    .map_err(|err| DateTimeFormatError::new(err.to_string()))?;
                if self.subsecond_nanos != 0 {
                    let fraction = format!("{:0>9}", self.subsecond_nanos);
                    out.push('.');
                    out.push_str(fraction.trim_end_matches('0'));
                }
                out.push('Z');
                Ok(out)
            }
            Format::HttpDate => {
                let date_time = self.to_offset_date_time()?;
                let description = format_description!(
                    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
                );
                date_time
                    .format(description)
                    .map_err(|err| DateTimeFormatError::new(err.to_string()))
            }
        }
    }

    fn from_offset_date_time(value: OffsetDateTime) -> Self {
        DateTime::from_secs_and_nanos(value.unix_timestamp(), value.nanosecond())
    }

    fn to_offset_date_time(self) -> Result<OffsetDateTime, DateTimeFormatError> {
        let nanos = self.seconds as i128 * NANOS_PER_SECOND as i128 + self.subsecond_nanos as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|err| DateTimeFormatError::new(err.to_string()))
    }
}

/// Failure to parse a `DateTime` from a string.
#[derive(Debug)]
pub struct DateTimeParseError {
    format: Format,
    message: String,
}

impl DateTimeParseError {
    fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
        }
    }
}

impl fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse {:?} timestamp: {}",
            self.format, self.message
        )
    }
}

impl StdError for DateTimeParseError {}

/// Failure to format a `DateTime` into a string.
#[derive(Debug)]
pub struct DateTimeFormatError {
    message: String,
}

impl DateTimeFormatError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DateTimeFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to format timestamp: {}", self.message)
    }
}

impl StdError for DateTimeFormatError {}

#[cfg(test)]
mod test {
    use super::{DateTime, Format};
    use proptest::prelude::*;

    #[test]
    fn test_fmt() {
        let date_time = DateTime::from_secs(1576540098);
        assert_eq!(
            date_time.fmt(Format::DateTime).unwrap(),
            "2019-12-16T23:48:18Z"
        );
        assert_eq!(date_time.fmt(Format::EpochSeconds).unwrap(), "1576540098");
        assert_eq!(
            date_time.fmt(Format::HttpDate).unwrap(),
            "Mon, 16 Dec 2019 23:48:18 GMT"
        );

        let date_time = DateTime::from_secs_and_nanos(1576540098, 520_000_000);
        assert_eq!(
            date_time.fmt(Format::DateTime).unwrap(),
            "2019-12-16T23:48:18.52Z"
        );
        assert_eq!(date_time.fmt(Format::EpochSeconds).unwrap(), "1576540098.52");
    }

    #[test]
    fn parse_each_format() {
        let expected = DateTime::from_secs(1576540098);
        assert_eq!(
            DateTime::from_str("2019-12-16T23:48:18Z", Format::DateTime).unwrap(),
            expected
        );
        assert_eq!(
            DateTime::from_str("2019-12-17T00:48:18+01:00", Format::DateTime).unwrap(),
            expected
        );
        assert_eq!(
            DateTime::from_str("Mon, 16 Dec 2019 23:48:18 GMT", Format::HttpDate).unwrap(),
            expected
        );
        assert_eq!(
            DateTime::from_str("1576540098", Format::EpochSeconds).unwrap(),
            expected
        );
        DateTime::from_str("yesterday", Format::EpochSeconds).expect_err("not a number");
    }

    #[test]
    fn parse_any_format() {
        let expected = DateTime::from_secs_and_nanos(1576540098, 500_000_000);
        assert_eq!(
            DateTime::from_str_any("2019-12-16T23:48:18.5Z").unwrap(),
            expected
        );
        assert_eq!(DateTime::from_str_any("1576540098.5").unwrap(), expected);
    }

    proptest! {
        #[test]
        fn date_time_format_is_reversible(secs in 0i64..253_402_300_799, nanos in 0u32..1_000_000_000) {
            let date_time = DateTime::from_secs_and_nanos(secs, nanos);
            let formatted = date_time.fmt(Format::DateTime).unwrap();
            prop_assert_eq!(DateTime::from_str(&formatted, Format::DateTime).unwrap(), date_time);
        }
    }
}
