/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Expressions: literals, references and function calls.

use crate::endpoint_lib::diagnostic::DiagnosticCollector;
use crate::endpoint_lib::partition::PartitionResolver;
use crate::error::{EvaluationError, RulesetError};
use crate::function::{FnNode, Function};
use crate::identifier::Identifier;
use crate::scope::Scope;
use crate::template::Template;
use crate::value::Value;
use std::fmt::{Display, Formatter};

/// State shared by every expression evaluated during one resolution.
pub(crate) struct EvalContext<'p> {
    pub(crate) partitions: &'p PartitionResolver,
    pub(crate) diagnostics: DiagnosticCollector,
}

impl<'p> EvalContext<'p> {
    pub(crate) fn new(partitions: &'p PartitionResolver) -> Self {
        Self {
            partitions,
            diagnostics: DiagnosticCollector::new(),
        }
    }
}

/// An expression.
///
/// Expressions are pure: evaluating the same expression in the same scope always gives the
/// same result.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A constant (string literals may contain placeholders)
    Literal(Literal),
    /// A reference to a parameter or a bound result
    Ref(Identifier),
    /// A function call
    Fn(FnNode),
}

impl Expr {
    /// A string literal, parsed as a [`Template`].
    pub fn string(template: &str) -> Result<Self, RulesetError> {
        Ok(Expr::Literal(Literal::string(template)?))
    }

    /// A reference to `name`.
    pub fn reference(name: impl Into<Identifier>) -> Self {
        Expr::Ref(name.into())
    }

    /// A call of `function` with `args`, validating its arity.
    pub fn call(function: Function, args: Vec<Expr>) -> Result<Self, RulesetError> {
        Ok(Expr::Fn(FnNode::new(function, args)?))
    }

    pub(crate) fn eval(
        &self,
        scope: &Scope<'_>,
        ctx: &mut EvalContext<'_>,
    ) -> Result<Value, EvaluationError> {
        match self {
            Expr::Literal(literal) => literal.eval(scope),
            Expr::Ref(name) => Ok(scope.resolve(name.as_str())),
            Expr::Fn(node) => node.eval(scope, ctx),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::Ref(name) => write!(f, "{name}"),
            Expr::Fn(node) => write!(f, "{node}"),
        }
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

impl From<FnNode> for Expr {
    fn from(node: FnNode) -> Self {
        Expr::Fn(node)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }
}

/// A constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// A string, possibly with placeholders
    Str(Template),
    /// A boolean
    Bool(bool),
    /// An integer
    Int(i64),
    /// An array of literals
    Tuple(Vec<Literal>),
    /// A record of literals
    Record(Vec<(Identifier, Literal)>),
}

impl Literal {
    /// A string literal, parsed as a [`Template`].
    pub fn string(template: &str) -> Result<Self, RulesetError> {
        Ok(Literal::Str(Template::parse(template)?))
    }

    pub(crate) fn eval(&self, scope: &Scope<'_>) -> Result<Value, EvaluationError> {
        Ok(match self {
            Literal::Str(template) => Value::String(template.render(scope)?),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Integer(*i),
            Literal::Tuple(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.eval(scope))
                    .collect::<Result<_, _>>()?,
            ),
            Literal::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(name, field)| Ok((name.clone(), field.eval(scope)?)))
                    .collect::<Result<_, EvaluationError>>()?,
            ),
        })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Str(template) => write!(f, "\"{template}\""),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Tuple(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::Record(fields) => {
                write!(f, "{{")?;
                for (idx, (name, field)) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {field}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<Template> for Literal {
    fn from(template: Template) -> Self {
        Literal::Str(template)
    }
}
