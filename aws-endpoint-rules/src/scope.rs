/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::identifier::Identifier;
use crate::value::Value;
use std::collections::HashMap;

/// Variable bindings visible while evaluating an expression.
///
/// Scopes form a chain through parent references. Lookups walk outward from the innermost
/// scope; bindings are only ever added to the innermost scope so a parent is never mutated by
/// its children. A scope chain lives for a single evaluation.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    bindings: HashMap<Identifier, Value>,
}

impl<'a> Scope<'a> {
    /// Creates a root scope with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root scope from `bindings`.
    pub fn from_bindings(bindings: HashMap<Identifier, Value>) -> Self {
        Self {
            parent: None,
            bindings,
        }
    }

    /// Creates an empty scope nested in this one.
    pub fn child(&'a self) -> Scope<'a> {
        Scope {
            parent: Some(self),
            bindings: HashMap::new(),
        }
    }

    /// Binds `name` in this scope, shadowing any outer binding of the same name.
    pub fn insert(&mut self, name: Identifier, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Looks up `name`, innermost scope first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.bindings.get(name) {
                return Some(value);
            }
            scope = current.parent;
        }
        None
    }

    /// Looks up `name`, treating a missing binding as [`Value::None`].
    pub fn resolve(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::None)
    }
}
