/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;

/// Checks that `host` is a valid DNS host label: `[a-zA-Z0-9][a-zA-Z0-9-]{0,62}`.
///
/// With `allow_dots`, every `.`-separated label must be valid on its own.
pub(crate) fn is_valid_host_label(
    host: &str,
    allow_dots: bool,
    e: &mut DiagnosticCollector,
) -> bool {
    if allow_dots {
        host.split('.').all(|label| is_valid_label(label, e))
    } else {
        is_valid_label(host, e)
    }
}

fn is_valid_label(label: &str, e: &mut DiagnosticCollector) -> bool {
    if label.is_empty() || label.len() > 63 {
        e.report_error("host label must be between 1 and 63 characters");
        return false;
    }
    let bytes = label.as_bytes();
    if !bytes[0].is_ascii_alphanumeric() {
        e.report_error(format!(
            "host label `{label}` must start with a letter or digit"
        ));
        return false;
    }
    if let Some(invalid) = bytes
        .iter()
        .find(|b| !(b.is_ascii_alphanumeric() || **b == b'-'))
    {
        e.report_error(format!(
            "host label `{label}` contains invalid character `{}`",
            *invalid as char
        ));
        return false;
    }
    true
}
