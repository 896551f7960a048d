/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Depth-first, first-match evaluation of rule sets.

use crate::bdd::EndpointBdd;
use crate::endpoint::Endpoint;
use crate::endpoint_lib::partition::{load_partitions, PartitionResolver};
use crate::error::EvaluationError;
use crate::expr::EvalContext;
use crate::identifier::Identifier;
use crate::rule::{Rule, RuleKind};
use crate::ruleset::EndpointRuleset;
use crate::scope::Scope;
use crate::value::Value;
use std::collections::HashMap;

/// Evaluates rule sets against caller-provided parameters.
///
/// An evaluator only borrows the partition table; every evaluation builds its own scope chain,
/// so one evaluator may be shared between threads.
#[derive(Clone, Copy, Debug)]
pub struct RuleEvaluator<'p> {
    partitions: &'p PartitionResolver,
}

impl RuleEvaluator<'static> {
    /// An evaluator backed by the built-in partition data.
    pub fn new() -> Self {
        Self {
            partitions: load_partitions(),
        }
    }
}

impl Default for RuleEvaluator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> RuleEvaluator<'p> {
    /// An evaluator backed by `partitions` instead of the built-in partition data.
    pub fn with_partitions(partitions: &'p PartitionResolver) -> Self {
        Self { partitions }
    }

    /// Evaluates `ruleset` against `params`.
    ///
    /// On success the result is always a [`Value::Endpoint`]. Parameters are validated against
    /// the rule set's schema before any rule runs.
    pub fn evaluate_ruleset(
        &self,
        ruleset: &EndpointRuleset,
        params: &HashMap<Identifier, Value>,
    ) -> Result<Value, EvaluationError> {
        let root = ruleset.parameters().bind(params)?;
        let mut ctx = EvalContext::new(self.partitions);
        match evaluate_rules(ruleset.rules(), &root, &mut ctx)? {
            Some(endpoint) => Ok(Value::Endpoint(endpoint)),
            None => Err(no_match(&mut ctx)),
        }
    }

    /// Evaluates a rule set in BDD form against `params`.
    pub fn evaluate_bdd(
        &self,
        bdd: &EndpointBdd,
        params: &HashMap<Identifier, Value>,
    ) -> Result<Value, EvaluationError> {
        let mut scope = bdd.parameters().bind(params)?;
        let mut ctx = EvalContext::new(self.partitions);
        match bdd.evaluate(&mut scope, &mut ctx)? {
            Some(endpoint) => Ok(Value::Endpoint(endpoint)),
            None => Err(no_match(&mut ctx)),
        }
    }
}

/// Evaluates `ruleset` against `params` using the built-in partition data.
pub fn evaluate(
    ruleset: &EndpointRuleset,
    params: &HashMap<Identifier, Value>,
) -> Result<Value, EvaluationError> {
    RuleEvaluator::new().evaluate_ruleset(ruleset, params)
}

fn no_match(ctx: &mut EvalContext<'_>) -> EvaluationError {
    match ctx.diagnostics.take_last_error() {
        Some(reason) => {
            tracing::debug!(last_error = %reason, "no endpoint rule matched")
        }
        None => tracing::debug!("no endpoint rule matched"),
    }
    EvaluationError::NoMatch
}

fn evaluate_rules(
    rules: &[Rule],
    scope: &Scope<'_>,
    ctx: &mut EvalContext<'_>,
) -> Result<Option<Endpoint>, EvaluationError> {
    for rule in rules {
        if let Some(endpoint) = evaluate_rule(rule, scope, ctx)? {
            return Ok(Some(endpoint));
        }
    }
    Ok(None)
}

/// Evaluates a single rule in a child of `parent`.
///
/// `Ok(None)` means the rule did not fire and evaluation should continue with its siblings.
/// Bindings made by the rule's conditions are dropped along with the child scope.
pub(crate) fn evaluate_rule(
    rule: &Rule,
    parent: &Scope<'_>,
    ctx: &mut EvalContext<'_>,
) -> Result<Option<Endpoint>, EvaluationError> {
    let mut scope = parent.child();
    for condition in rule.conditions() {
        if !condition.eval(&mut scope, ctx)? {
            tracing::trace!(condition = %condition, "condition not satisfied");
            return Ok(None);
        }
    }
    match rule.kind() {
        RuleKind::Tree(rules) => {
            let endpoint = evaluate_rules(rules, &scope, ctx)?;
            if endpoint.is_none() {
                tracing::trace!(
                    documentation = rule.documentation().unwrap_or_default(),
                    "no rule in tree matched"
                );
            }
            Ok(endpoint)
        }
        RuleKind::Endpoint(result) => {
            let endpoint = result.resolve(&scope, ctx)?;
            tracing::trace!(url = %endpoint.url(), "endpoint rule matched");
            Ok(Some(endpoint))
        }
        RuleKind::Error(message) => {
            let message = message.eval(&scope, ctx)?.expect_string()?.to_owned();
            tracing::trace!(message = %message, "error rule matched");
            Err(EvaluationError::Rule(message))
        }
    }
}
