/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Endpoint resolution for callers that do not care about rule set internals.

use crate::endpoint::Endpoint;
use crate::endpoint_lib::partition::PartitionResolver;
use crate::error::EvaluationError;
use crate::evaluator::RuleEvaluator;
use crate::identifier::Identifier;
use crate::ruleset::EndpointRuleset;
use crate::value::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

type BoxError = Box<dyn Error + Send + Sync>;

/// Result of resolving an endpoint
pub type Result = std::result::Result<Endpoint, ResolveEndpointError>;

/// Resolves an [`Endpoint`] from endpoint parameters.
pub trait ResolveEndpoint: Send + Sync {
    /// Resolves the endpoint for `params`.
    fn resolve_endpoint(&self, params: &Params) -> Result;
}

// Implement the resolver trait for all closures and functions that take
// `Params` and return a `Result`
impl<Resolver> ResolveEndpoint for Resolver
where
    Resolver: Fn(&Params) -> Result + Send + Sync,
{
    fn resolve_endpoint(&self, params: &Params) -> Result {
        (self)(params)
    }
}

/// Endpoint resolution error
#[derive(Debug)]
pub struct ResolveEndpointError {
    message: String,
    source: Option<BoxError>,
}

impl ResolveEndpointError {
    /// Create a [`ResolveEndpointError`] with a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a [`ResolveEndpointError`] with a message and a source
    pub fn from_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::message(message).with_source(Some(source.into()))
    }

    /// Add a source to the error
    pub fn with_source(self, source: Option<BoxError>) -> Self {
        Self { source, ..self }
    }

    /// The error message
    pub fn as_message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ResolveEndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ResolveEndpointError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}

impl From<EvaluationError> for ResolveEndpointError {
    fn from(err: EvaluationError) -> Self {
        match err {
            // Error rules are written for end users; surface them verbatim.
            EvaluationError::Rule(message) => Self::message(message),
            other => Self::from_source("failed to evaluate endpoint rules", other),
        }
    }
}

/// Endpoint parameters: a name for each value passed into rule set evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: HashMap<Identifier, Value>,
}

impl Params {
    /// Creates a builder for [`Params`].
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::default()
    }

    /// Converts these params back into a builder so more values can be set.
    pub fn into_builder(self) -> ParamsBuilder {
        ParamsBuilder {
            values: self.values,
        }
    }

    /// The value of parameter `name`, if set
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Every set parameter, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Value)> {
        self.values.iter()
    }

    pub(crate) fn as_map(&self) -> &HashMap<Identifier, Value> {
        &self.values
    }
}

impl From<HashMap<Identifier, Value>> for Params {
    fn from(values: HashMap<Identifier, Value>) -> Self {
        Self { values }
    }
}

/// Builder for [`Params`]
#[derive(Clone, Debug, Default)]
pub struct ParamsBuilder {
    values: HashMap<Identifier, Value>,
}

impl ParamsBuilder {
    /// Sets parameter `name`, replacing any previous value.
    pub fn set(mut self, name: impl Into<Identifier>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets parameter `name` when `value` is `Some`.
    pub fn set_if_some<V: Into<Value>>(self, name: impl Into<Identifier>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// Constructs the [`Params`].
    pub fn build(self) -> Params {
        Params {
            values: self.values,
        }
    }
}

/// Resolves endpoints by evaluating an [`EndpointRuleset`].
#[derive(Clone, Debug)]
pub struct DefaultResolver {
    ruleset: Arc<EndpointRuleset>,
    partitions: Option<Arc<PartitionResolver>>,
}

impl DefaultResolver {
    /// Creates a resolver using the built-in partition data.
    pub fn new(ruleset: impl Into<Arc<EndpointRuleset>>) -> Self {
        Self {
            ruleset: ruleset.into(),
            partitions: None,
        }
    }

    /// Uses `partitions` instead of the built-in partition data.
    pub fn with_partitions(mut self, partitions: impl Into<Arc<PartitionResolver>>) -> Self {
        self.partitions = Some(partitions.into());
        self
    }

    /// The rule set this resolver evaluates
    pub fn ruleset(&self) -> &EndpointRuleset {
        &self.ruleset
    }

    fn evaluate(&self, params: &Params) -> std::result::Result<Endpoint, EvaluationError> {
        let evaluator = match &self.partitions {
            Some(partitions) => RuleEvaluator::with_partitions(partitions),
            None => RuleEvaluator::new(),
        };
        match evaluator.evaluate_ruleset(&self.ruleset, params.as_map())? {
            Value::Endpoint(endpoint) => Ok(endpoint),
            other => Err(EvaluationError::unexpected_type(
                "endpoint",
                other.type_name(),
            )),
        }
    }
}

impl ResolveEndpoint for DefaultResolver {
    fn resolve_endpoint(&self, params: &Params) -> Result {
        let endpoint = self.evaluate(params)?;
        tracing::debug!(endpoint = %endpoint.url(), "resolved endpoint");
        Ok(endpoint)
    }
}
