/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Formatting values as URI path labels.

use awsgen_types::date_time::{DateTimeFormatError, Format};
use awsgen_types::DateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

const BASE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'/')
    .add(b':')
    .add(b',')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'@')
    .add(b'!')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b';')
    .add(b'=')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'"')
    .add(b'^')
    .add(b'`')
    .add(b'\\');

const GREEDY: &AsciiSet = &BASE_SET.remove(b'/');

/// Percent-encodes `value` for use as a path label. Greedy labels keep `/` unencoded.
pub fn fmt_string<T: AsRef<str>>(value: T, greedy: bool) -> String {
    let set = if greedy { GREEDY } else { BASE_SET };
    utf8_percent_encode(value.as_ref(), set).to_string()
}

/// Formats a timestamp as a path label.
pub fn fmt_timestamp(value: &DateTime, format: Format) -> Result<String, DateTimeFormatError> {
    Ok(fmt_string(value.fmt(format)?, false))
}

#[cfg(test)]
mod test {
    use super::{fmt_string, fmt_timestamp};
    use awsgen_types::date_time::Format;
    use awsgen_types::DateTime;
    use proptest::proptest;

    #[test]
    fn greedy_labels_keep_slashes() {
        assert_eq!(fmt_string("photos/2021/a b.png", true), "photos/2021/a%20b.png");
        assert_eq!(fmt_string("photos/2021/a b.png", false), "photos%2F2021%2Fa%20b.png");
    }

    #[test]
    fn reserved_characters() {
        assert_eq!(fmt_string("a+b=c&d", false), "a%2Bb%3Dc%26d");
        assert_eq!(fmt_string("unreserved-._~", false), "unreserved-._~");
    }

    #[test]
    fn timestamps() {
        assert_eq!(
            fmt_timestamp(&DateTime::from_secs(1576540098), Format::DateTime).unwrap(),
            "2019-12-16T23%3A48%3A18Z"
        );
    }

    proptest! {
        #[test]
        fn labels_decode_to_input(value: String, greedy: bool) {
            let encoded = fmt_string(&value, greedy);
            let decoded = percent_encoding::percent_decode_str(&encoded).decode_utf8().unwrap();
            assert_eq!(decoded, value.as_str());
            assert!(!encoded.contains(' '));
            if !greedy {
                assert!(!encoded.contains('/'));
            }
        }
    }
}
