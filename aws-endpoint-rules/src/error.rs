/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Errors produced while loading and evaluating rule sets.

use crate::function::Arity;
use crate::identifier::Identifier;

/// Failure while evaluating a rule set.
///
/// Every evaluation failure is fatal for the resolution that produced it: the engine never
/// retries and never returns a partial result.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EvaluationError {
    /// A parameter declared as required was neither provided nor defaulted.
    #[error("missing required parameter `{0}`")]
    MissingParameter(Identifier),

    /// A provided parameter does not match its declared type.
    #[error("parameter `{name}` must be {expected} but was {found}")]
    InvalidParameter {
        /// Parameter name
        name: Identifier,
        /// Declared type
        expected: &'static str,
        /// Type of the provided value
        found: &'static str,
    },

    /// A value of the wrong variant reached a consumer.
    #[error("expected {expected} but found {found}")]
    UnexpectedType {
        /// The variant the consumer needed
        expected: &'static str,
        /// The variant it received
        found: &'static str,
    },

    /// An argument had the right type but an unusable value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure inside a built-in function.
    #[error("while evaluating {name}: {cause}")]
    Function {
        /// Function name as it appears in rule sets
        name: &'static str,
        /// Underlying failure
        cause: Box<EvaluationError>,
    },

    /// An error rule was reached. The message is the rule's evaluated error expression.
    #[error("{0}")]
    Rule(String),

    /// No rule fired.
    #[error("no rules matched")]
    NoMatch,
}

impl EvaluationError {
    pub(crate) fn unexpected_type(expected: &'static str, found: &'static str) -> Self {
        EvaluationError::UnexpectedType { expected, found }
    }

    pub(crate) fn in_function(self, name: &'static str) -> Self {
        EvaluationError::Function {
            name,
            cause: Box::new(self),
        }
    }

    /// Returns the message of the error rule that produced this error, if any.
    pub fn rule_message(&self) -> Option<&str> {
        match self {
            EvaluationError::Rule(message) => Some(message),
            _ => None,
        }
    }
}

/// Failure while building or loading a rule set.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RulesetError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("failed to parse rule set document: {0}")]
    Json(#[from] serde_json::Error),

    /// A function name is not part of the function library.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// A function was given the wrong number of arguments.
    #[error("`{name}` expects {expected} argument(s) but {found} were provided")]
    Arity {
        /// Function name
        name: &'static str,
        /// Accepted argument count
        expected: Arity,
        /// Provided argument count
        found: usize,
    },

    /// A string template could not be parsed.
    #[error("invalid template `{template}`: {message}")]
    InvalidTemplate {
        /// Raw template
        template: String,
        /// What went wrong
        message: &'static str,
    },

    /// A `getAttr` path could not be parsed.
    #[error("invalid attribute path `{0}`")]
    InvalidPath(String),

    /// Structural problem in the document (unknown rule type, bad literal, ...).
    #[error("invalid rule set: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod test {
    use super::EvaluationError;

    #[test]
    fn function_errors_name_the_function() {
        let err = EvaluationError::unexpected_type("bool", "string").in_function("booleanEquals");
        assert_eq!(
            err.to_string(),
            "while evaluating booleanEquals: expected bool but found string"
        );
    }

    #[test]
    fn rule_errors_expose_their_message() {
        let err = EvaluationError::Rule("Invalid Configuration: Missing Region".into());
        assert_eq!(err.rule_message(), Some("Invalid Configuration: Missing Region"));
        assert_eq!(EvaluationError::NoMatch.rule_message(), None);
    }
}
