/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::RulesetError;
use crate::parameters::{Parameter, Parameters};
use crate::rule::Rule;

/// A complete rule set: a parameter schema and the root rules.
///
/// Rule sets are immutable once built and are meant to be built once per service and shared,
/// typically behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointRuleset {
    version: String,
    parameters: Parameters,
    rules: Vec<Rule>,
}

impl EndpointRuleset {
    /// Creates a builder for an [`EndpointRuleset`].
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Parses a published endpoint rule set document.
    ///
    /// Unknown functions, arity mismatches and malformed templates are reported here rather than
    /// during evaluation.
    pub fn from_json(document: &str) -> Result<Self, RulesetError> {
        crate::json::parse_ruleset(document)
    }

    /// Version of the rule set format
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parameter declarations
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Root rules, evaluated in order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Builder for [`EndpointRuleset`]
#[derive(Clone, Debug)]
pub struct Builder {
    version: String,
    parameters: Vec<Parameter>,
    rules: Vec<Rule>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            parameters: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl Builder {
    /// Sets the version. Defaults to `1.0`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Declares a parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends a root rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends root rules.
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Constructs the [`EndpointRuleset`].
    pub fn build(self) -> EndpointRuleset {
        EndpointRuleset {
            version: self.version,
            parameters: Parameters::new(self.parameters),
            rules: self.rules,
        }
    }
}
