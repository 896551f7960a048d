/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;

/// Returns the ASCII substring `[start, stop)` of `input`.
///
/// With `reverse`, the indices count from the end of the string: `substring("abcde", 0, 2,
/// true)` is `"de"`. Returns `None` when `start >= stop`, when `stop` is past the end of the
/// string, or when `input` contains non-ASCII characters.
pub(crate) fn substring<'a>(
    input: &'a str,
    start: usize,
    stop: usize,
    reverse: bool,
    e: &mut DiagnosticCollector,
) -> Option<&'a str> {
    if start >= stop {
        e.report_error("substring start must be less than stop");
        return None;
    }
    if !input.is_ascii() {
        e.report_error("substring input contained non-ASCII characters");
        return None;
    }
    if stop > input.len() {
        e.report_error(format!(
            "substring stop ({stop}) is past the end of the input ({})",
            input.len()
        ));
        return None;
    }
    let (start, stop) = if reverse {
        (input.len() - stop, input.len() - start)
    } else {
        (start, stop)
    };
    Some(&input[start..stop])
}
