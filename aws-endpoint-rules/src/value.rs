/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint::Endpoint;
use crate::error::EvaluationError;
use crate::identifier::Identifier;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// A dynamically typed value manipulated by the rules engine.
///
/// `None` is an explicit "absent" marker: it is the value of an unset parameter and of
/// functions that do not apply to their input (for example `parseURL` on a malformed URL).
/// It is distinct from every other variant and is falsy.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string
    String(String),
    /// A boolean
    Bool(bool),
    /// An integer
    Integer(i64),
    /// An ordered sequence of values
    Array(Vec<Value>),
    /// A record of named fields
    Record(HashMap<Identifier, Value>),
    /// A resolved endpoint
    Endpoint(Endpoint),
    /// No value
    None,
}

impl Value {
    /// Name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Endpoint(_) => "endpoint",
            Value::None => "none",
        }
    }

    /// Returns true if this is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Condition semantics: `Bool(b)` is `b`, `None` is false, anything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::None => false,
            _ => true,
        }
    }

    /// Returns the string, or a type error.
    pub fn expect_string(&self) -> Result<&str, EvaluationError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(EvaluationError::unexpected_type("string", other.type_name())),
        }
    }

    /// Returns the boolean, or a type error.
    pub fn expect_bool(&self) -> Result<bool, EvaluationError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EvaluationError::unexpected_type("bool", other.type_name())),
        }
    }

    /// Returns the integer, or a type error.
    pub fn expect_integer(&self) -> Result<i64, EvaluationError> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(EvaluationError::unexpected_type("integer", other.type_name())),
        }
    }

    /// Returns the array elements, or a type error.
    pub fn expect_array(&self) -> Result<&[Value], EvaluationError> {
        match self {
            Value::Array(values) => Ok(values),
            other => Err(EvaluationError::unexpected_type("array", other.type_name())),
        }
    }

    /// Returns the record fields, or a type error.
    pub fn expect_record(&self) -> Result<&HashMap<Identifier, Value>, EvaluationError> {
        match self {
            Value::Record(fields) => Ok(fields),
            other => Err(EvaluationError::unexpected_type("record", other.type_name())),
        }
    }

    /// Returns the endpoint, or a type error.
    pub fn expect_endpoint(&self) -> Result<&Endpoint, EvaluationError> {
        match self {
            Value::Endpoint(endpoint) => Ok(endpoint),
            other => Err(EvaluationError::unexpected_type("endpoint", other.type_name())),
        }
    }

    /// Returns the string if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Builds a record from `(name, value)` pairs.
    pub fn record<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Identifier>,
        V: Into<Value>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                // sorted so that diagnostics are stable
                let mut fields: Vec<_> = fields.iter().collect();
                fields.sort_by(|a, b| a.0.cmp(b.0));
                write!(f, "{{")?;
                for (idx, (name, value)) in fields.into_iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Endpoint(endpoint) => write!(f, "endpoint({})", endpoint.url()),
            Value::None => write!(f, "<none>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}

impl From<HashMap<Identifier, Value>> for Value {
    fn from(fields: HashMap<Identifier, Value>) -> Self {
        Value::Record(fields)
    }
}

impl From<Endpoint> for Value {
    fn from(endpoint: Endpoint) -> Self {
        Value::Endpoint(endpoint)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::None)
    }
}
