/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unencoded by `uriEncode` are exactly the RFC-3986 unreserved set.
///
/// Everything else, including `/`, `:` and `*`, is percent encoded. Space becomes `%20` (never
/// `+`) and `~` is never encoded.
pub(crate) const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn uri_encode<'a>(s: &'a str, _e: &mut DiagnosticCollector) -> std::borrow::Cow<'a, str> {
    utf8_percent_encode(s, URI_ENCODE_SET).into()
}

#[cfg(test)]
mod test {
    use super::uri_encode;
    use crate::endpoint_lib::diagnostic::DiagnosticCollector;
    use proptest::prelude::*;

    fn encode(s: &str) -> String {
        uri_encode(s, &mut DiagnosticCollector::new()).into_owned()
    }

    #[test]
    fn aws_conventions() {
        assert_eq!(encode("a b"), "a%20b");
        assert_eq!(encode("a*b"), "a%2Ab");
        assert_eq!(encode("a~b"), "a~b");
        assert_eq!(encode("a+b"), "a%2Bb");
        assert_eq!(encode("key/with:colon"), "key%2Fwith%3Acolon");
        assert_eq!(encode("abc-_.XYZ019"), "abc-_.XYZ019");
    }

    #[test]
    fn multibyte_characters_are_encoded_as_utf8() {
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn unchanged_input_is_borrowed() {
        let mut e = DiagnosticCollector::new();
        assert!(matches!(
            uri_encode("bucket-name", &mut e),
            std::borrow::Cow::Borrowed("bucket-name")
        ));
    }

    proptest! {
        #[test]
        fn output_contains_only_unreserved_or_escapes(s in ".*") {
            let encoded = encode(&s);
            prop_assert!(encoded
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"-_.~%".contains(&b)));
            let decoded = percent_encoding::percent_decode_str(&encoded).decode_utf8().unwrap();
            prop_assert_eq!(decoded, s.as_str());
        }
    }
}
