/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;
use crate::endpoint_lib::host::is_valid_host_label;
use regex_lite::Regex;
use std::sync::LazyLock;

static VIRTUAL_HOSTABLE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z\\d][a-z\\d\\-.]{1,61}[a-z\\d]$").unwrap());

static IPV4: LazyLock<Regex> = LazyLock::new(|| Regex::new("^(\\d+\\.){3}\\d+$").unwrap());

static DOTS_AND_DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^.*((\\.-)|(-\\.)|(\\.\\.)).*$").unwrap());

/// Evaluates whether a string is a DNS-compatible bucket name that can be used with virtual
/// hosted style addressing.
pub(crate) fn is_virtual_hostable_s3_bucket(
    host_label: &str,
    allow_subdomains: bool,
    e: &mut DiagnosticCollector,
) -> bool {
    if !is_valid_host_label(host_label, allow_subdomains, e) {
        false
    } else if !allow_subdomains {
        is_virtual_hostable_segment(host_label)
    } else {
        is_virtual_hostable_segment(host_label)
            && !IPV4.is_match(host_label)
            && !DOTS_AND_DASHES.is_match(host_label)
    }
}

fn is_virtual_hostable_segment(host_label: &str) -> bool {
    VIRTUAL_HOSTABLE_SEGMENT.is_match(host_label)
}

#[cfg(test)]
mod test {
    use super::is_virtual_hostable_s3_bucket;
    use crate::endpoint_lib::diagnostic::DiagnosticCollector;
    use proptest::prelude::*;

    fn hostable(bucket: &str, allow_dots: bool) -> bool {
        is_virtual_hostable_s3_bucket(bucket, allow_dots, &mut DiagnosticCollector::new())
    }

    #[test]
    fn bucket_names() {
        assert!(hostable("my-bucket", false));
        assert!(hostable("abc", false));
        assert!(!hostable("ab", false));
        assert!(!hostable("MyBucket", false));
        assert!(!hostable("-bucket", false));
        assert!(!hostable("bucket-", false));
        assert!(!hostable(&"a".repeat(64), false));
        assert!(hostable(&"a".repeat(63), false));
    }

    #[test]
    fn dotted_bucket_names() {
        assert!(!hostable("my.bucket", false));
        assert!(hostable("my.bucket", true));
        assert!(!hostable("192.168.1.1", true));
        assert!(!hostable("my..bucket", true));
        assert!(!hostable("my.-bucket", true));
        assert!(!hostable("my-.bucket", true));
    }

    proptest! {
        #[test]
        fn uppercase_is_never_hostable(bucket in "[a-z]{1,10}[A-Z][a-z]{1,10}", allow_dots: bool) {
            prop_assert!(!hostable(&bucket, allow_dots));
        }
    }
}
