/*
 *  Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 *  SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;

/// Splits `value` on `delimiter`.
///
/// `limit` controls how many parts are produced:
/// - `0`: split on every occurrence
/// - `1`: no split, the input is returned as the only element
/// - `n > 1`: at most `n` parts, the last one holding the unsplit remainder
///
/// Returns `None` for an empty delimiter.
pub(crate) fn split<'a>(
    value: &'a str,
    delimiter: &str,
    limit: usize,
    e: &mut DiagnosticCollector,
) -> Option<Vec<&'a str>> {
    if delimiter.is_empty() {
        e.report_error("split delimiter must not be empty");
        return None;
    }
    Some(match limit {
        0 => value.split(delimiter).collect(),
        limit => value.splitn(limit, delimiter).collect(),
    })
}
