/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Endpoint rules engine.
//!
//! An endpoint rule set declares a set of parameters (region, FIPS, a custom endpoint, ...) and
//! a tree of rules. Each rule is a list of conditions, function calls over the parameters, and
//! an outcome: a nested list of rules, an endpoint, or an error. Evaluation is depth-first and
//! the first rule whose conditions all hold decides the result.
//!
//! ```no_run
//! use aws_endpoint_rules::{DefaultResolver, EndpointRuleset, Params, ResolveEndpoint};
//!
//! # fn example(document: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = DefaultResolver::new(EndpointRuleset::from_json(document)?);
//! let endpoint = resolver.resolve_endpoint(
//!     &Params::builder()
//!         .set("Region", "us-west-2")
//!         .set("UseFIPS", false)
//!         .build(),
//! )?;
//! println!("{}", endpoint.url());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod apply;
pub mod auth;
pub mod bdd;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod function;
pub mod parameters;
pub mod resolver;
pub mod rule;
pub mod ruleset;
pub mod scope;

#[doc(hidden)]
pub mod os_shim_internal;

mod endpoint_lib;
mod identifier;
mod json;
mod path;
mod template;
mod value;

pub use apply::{apply_endpoint, EndpointPrefix};
pub use bdd::{BddNode, EndpointBdd};
pub use endpoint::Endpoint;
pub use endpoint_lib::partition::{load_partitions, PartitionOutput, PartitionResolver};
pub use error::{EvaluationError, RulesetError};
pub use evaluator::{evaluate, RuleEvaluator};
pub use identifier::Identifier;
pub use path::AttrPath;
pub use resolver::{DefaultResolver, Params, ResolveEndpoint, ResolveEndpointError};
pub use ruleset::EndpointRuleset;
pub use template::Template;
pub use value::Value;
