/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Rules, conditions and endpoint templates.

use crate::endpoint::Endpoint;
use crate::error::{EvaluationError, RulesetError};
use crate::expr::{EvalContext, Expr, Literal};
use crate::function::FnNode;
use crate::identifier::Identifier;
use crate::scope::Scope;
use std::fmt::{Display, Formatter};

/// A function call gating a rule, optionally binding its result.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    function: FnNode,
    assign: Option<Identifier>,
}

impl Condition {
    /// A condition satisfied when `function` evaluates to a truthy value.
    pub fn new(function: FnNode) -> Self {
        Self {
            function,
            assign: None,
        }
    }

    /// Binds the result of the function to `name` when the condition is satisfied.
    pub fn assign(mut self, name: impl Into<Identifier>) -> Self {
        self.assign = Some(name.into());
        self
    }

    /// The function this condition evaluates
    pub fn function(&self) -> &FnNode {
        &self.function
    }

    /// The name the result is bound to, if any
    pub fn result_name(&self) -> Option<&Identifier> {
        self.assign.as_ref()
    }

    /// Evaluates the condition in `scope`, binding its result there when it holds.
    pub(crate) fn eval(
        &self,
        scope: &mut Scope<'_>,
        ctx: &mut EvalContext<'_>,
    ) -> Result<bool, EvaluationError> {
        let value = self.function.eval(scope, ctx)?;
        let satisfied = value.is_truthy();
        if satisfied {
            if let Some(name) = &self.assign {
                scope.insert(name.clone(), value);
            }
        }
        Ok(satisfied)
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.assign {
            Some(name) => write!(f, "{name} = {}", self.function),
            None => write!(f, "{}", self.function),
        }
    }
}

impl From<FnNode> for Condition {
    fn from(function: FnNode) -> Self {
        Condition::new(function)
    }
}

/// What a rule does once all of its conditions hold.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleKind {
    /// Evaluate nested rules in order
    Tree(Vec<Rule>),
    /// Resolve to an endpoint
    Endpoint(EndpointResult),
    /// Fail with the evaluated message
    Error(Expr),
}

/// A rule: ordered conditions and what to do when they all hold.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    conditions: Vec<Condition>,
    kind: RuleKind,
    documentation: Option<String>,
}

impl Rule {
    /// A rule evaluating `rules` when `conditions` hold.
    pub fn tree(conditions: Vec<Condition>, rules: Vec<Rule>) -> Self {
        Self::new(conditions, RuleKind::Tree(rules))
    }

    /// A rule resolving to `endpoint` when `conditions` hold.
    pub fn endpoint(conditions: Vec<Condition>, endpoint: EndpointResult) -> Self {
        Self::new(conditions, RuleKind::Endpoint(endpoint))
    }

    /// A rule failing with `message` when `conditions` hold.
    pub fn error(conditions: Vec<Condition>, message: Expr) -> Self {
        Self::new(conditions, RuleKind::Error(message))
    }

    fn new(conditions: Vec<Condition>, kind: RuleKind) -> Self {
        Self {
            conditions,
            kind,
            documentation: None,
        }
    }

    /// Attaches documentation to the rule.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Conditions of this rule, evaluated in order
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// What this rule does
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Documentation, if any
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }
}

/// The endpoint produced by an endpoint rule.
///
/// The URL and header values are expressions, usually string templates such as
/// `https://acm.{Region}.{PartitionResult#dnsSuffix}`. Properties are literals whose templates
/// are rendered against the final scope.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointResult {
    url: Expr,
    headers: Vec<(String, Vec<Expr>)>,
    properties: Vec<(String, Literal)>,
}

impl EndpointResult {
    /// Creates a builder for an [`EndpointResult`].
    pub fn builder() -> EndpointResultBuilder {
        EndpointResultBuilder::default()
    }

    /// The URL expression
    pub fn url(&self) -> &Expr {
        &self.url
    }

    pub(crate) fn resolve(
        &self,
        scope: &Scope<'_>,
        ctx: &mut EvalContext<'_>,
    ) -> Result<Endpoint, EvaluationError> {
        let url = self.url.eval(scope, ctx)?;
        let mut endpoint = Endpoint::builder().url(url.expect_string()?);
        for (name, values) in &self.headers {
            for value in values {
                let value = value.eval(scope, ctx)?;
                endpoint = endpoint.header(name, value.expect_string()?);
            }
        }
        for (name, property) in &self.properties {
            endpoint = endpoint.property(name, property.eval(scope)?);
        }
        Ok(endpoint.build())
    }
}

/// Builder for [`EndpointResult`]
#[derive(Clone, Debug, Default)]
pub struct EndpointResultBuilder {
    url: Option<Expr>,
    headers: Vec<(String, Vec<Expr>)>,
    properties: Vec<(String, Literal)>,
}

impl EndpointResultBuilder {
    /// Sets the URL expression. Required.
    pub fn url(mut self, url: Expr) -> Self {
        self.url = Some(url);
        self
    }

    /// Appends a value expression for header `name`.
    pub fn header(mut self, name: impl Into<String>, value: Expr) -> Self {
        let name = name.into();
        match self.headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((name, vec![value])),
        }
        self
    }

    /// Sets property `name`.
    pub fn property(mut self, name: impl Into<String>, value: Literal) -> Self {
        self.properties.push((name.into(), value));
        self
    }

    /// Constructs the [`EndpointResult`]. Fails if the URL was never set.
    pub fn build(self) -> Result<EndpointResult, RulesetError> {
        let url = self
            .url
            .ok_or_else(|| RulesetError::Invalid("endpoint result has no url".into()))?;
        Ok(EndpointResult {
            url,
            headers: self.headers,
            properties: self.properties,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Condition, EndpointResult};
    use crate::error::RulesetError;
    use crate::endpoint_lib::partition::load_partitions;
    use crate::expr::{EvalContext, Expr, Literal};
    use crate::function::{FnNode, Function};
    use crate::identifier::Identifier;
    use crate::scope::Scope;

    #[test]
    fn satisfied_conditions_bind_their_result() {
        let mut root = Scope::new();
        root.insert(Identifier::from_static("Region"), "us-west-2".into());
        let mut scope = root.child();
        let condition = Condition::new(
            FnNode::new(Function::AwsPartition, vec![Expr::reference("Region")]).unwrap(),
        )
        .assign("PartitionResult");
        assert_eq!(
            condition.to_string(),
            "PartitionResult = aws.partition(Region)"
        );
        let mut ctx = EvalContext::new(load_partitions());
        assert!(condition.eval(&mut scope, &mut ctx).unwrap());
        assert!(scope.get("PartitionResult").is_some());
        assert!(root.get("PartitionResult").is_none());
    }

    #[test]
    fn unsatisfied_conditions_do_not_bind() {
        let mut scope = Scope::new();
        let condition = Condition::new(
            FnNode::new(Function::ParseUrl, vec![Expr::string("not a url").unwrap()]).unwrap(),
        )
        .assign("url");
        let mut ctx = EvalContext::new(load_partitions());
        assert!(!condition.eval(&mut scope, &mut ctx).unwrap());
        assert!(scope.get("url").is_none());
        assert!(ctx.diagnostics.take_last_error().is_some());
    }

    #[test]
    fn endpoint_results_render_against_the_scope() {
        let mut scope = Scope::new();
        scope.insert(Identifier::from_static("Region"), "eu-west-1".into());
        let result = EndpointResult::builder()
            .url(Expr::string("https://service.{Region}.amazonaws.com").unwrap())
            .header("x-amz-region", Expr::reference("Region"))
            .header("x-amz-region", Expr::string("fallback").unwrap())
            .property(
                "authSchemes",
                Literal::Tuple(vec![Literal::Record(vec![
                    (Identifier::from_static("name"), Literal::string("sigv4").unwrap()),
                    (
                        Identifier::from_static("signingRegion"),
                        Literal::string("{Region}").unwrap(),
                    ),
                ])]),
            )
            .build()
            .unwrap();
        let endpoint = result
            .resolve(&scope, &mut EvalContext::new(load_partitions()))
            .unwrap();
        assert_eq!(endpoint.url(), "https://service.eu-west-1.amazonaws.com");
        assert_eq!(
            endpoint.header("x-amz-region"),
            Some(&["eu-west-1".to_string(), "fallback".to_string()][..])
        );
        assert_eq!(
            endpoint.credential_scope().unwrap().region(),
            Some("eu-west-1")
        );
    }

    #[test]
    fn endpoint_urls_must_be_strings() {
        let result = EndpointResult::builder()
            .url(Expr::reference("Unset"))
            .build()
            .unwrap();
        assert!(result
            .resolve(&Scope::new(), &mut EvalContext::new(load_partitions()))
            .is_err());
    }

    #[test]
    fn endpoint_results_require_a_url() {
        let err = EndpointResult::builder()
            .header("x-amz-region", Expr::reference("Region"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RulesetError::Invalid(_)));
        assert_eq!(err.to_string(), "invalid rule set: endpoint result has no url");
    }
}
