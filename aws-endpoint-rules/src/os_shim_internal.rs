/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Environment variable access that tests can replace with an in-memory map.

use std::collections::HashMap;
use std::env::VarError;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Environment variable abstraction
///
/// Environment variables are global to a process and difficult to test with a multi-threaded
/// test runner. `Env` reads either from the real process environment ([`std::env::var`]) or
/// from a map.
///
/// Cheap to clone: a faked environment is shared behind an `Arc`.
#[derive(Clone)]
pub struct Env(Arc<Inner>);

enum Inner {
    Real,
    Fake(HashMap<String, String>),
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

impl Debug for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            Inner::Real => f.write_str("Env::Real"),
            Inner::Fake(vars) => {
                let mut keys: Vec<_> = vars.keys().collect();
                keys.sort();
                f.debug_tuple("Env::Fake").field(&keys).finish()
            }
        }
    }
}

impl Env {
    /// Reads the variable `key`.
    pub fn get(&self, key: &str) -> Result<String, VarError> {
        match self.0.as_ref() {
            Inner::Real => std::env::var(key),
            Inner::Fake(vars) => vars.get(key).cloned().ok_or(VarError::NotPresent),
        }
    }

    /// Create a fake process environment from a slice of tuples.
    ///
    /// # Example
    /// ```rust
    /// use aws_endpoint_rules::os_shim_internal::Env;
    /// let env = Env::from_slice(&[("AWS_REGION", "us-west-2")]);
    /// assert_eq!(env.get("AWS_REGION").unwrap(), "us-west-2");
    /// ```
    pub fn from_slice(vars: &[(&str, &str)]) -> Self {
        Self(Arc::new(Inner::Fake(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )))
    }

    /// Create a process environment that uses the real process environment
    pub fn real() -> Self {
        Self(Arc::new(Inner::Real))
    }
}

impl From<HashMap<String, String>> for Env {
    fn from(vars: HashMap<String, String>) -> Self {
        Self(Arc::new(Inner::Fake(vars)))
    }
}
