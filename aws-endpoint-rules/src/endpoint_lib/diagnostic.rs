/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::error::Error;

type BoxError = Box<dyn Error + Send + Sync>;

/// Collects the reason a library function returned `None`.
///
/// Functions such as `parseURL` treat malformed input as "does not apply" rather than as a
/// failure. The reason is still useful when a rule set unexpectedly falls through, so it is
/// recorded here and logged.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    last_error: Option<BoxError>,
}

impl DiagnosticCollector {
    pub(crate) fn new() -> Self {
        Self { last_error: None }
    }

    /// Report an error to the collector
    pub(crate) fn report_error(&mut self, err: impl Into<BoxError>) {
        let err = err.into();
        tracing::trace!(reason = %err, "endpoint function did not apply");
        self.last_error = Some(err);
    }

    /// Capture a result, returning `None` and recording the error if it failed
    pub(crate) fn capture<T, E: Into<BoxError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report_error(err);
                None
            }
        }
    }

    pub(crate) fn take_last_error(&mut self) -> Option<BoxError> {
        self.last_error.take()
    }
}
