/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Loading of JSON rule set and BDD documents.

use crate::bdd::{BddNode, EndpointBdd};
use crate::error::RulesetError;
use crate::expr::{Expr, Literal};
use crate::function::FnNode;
use crate::identifier::Identifier;
use crate::parameters::{BuiltIn, Deprecated, Parameter, ParameterType};
use crate::rule::{Condition, EndpointResult, Rule};
use crate::ruleset::EndpointRuleset;
use crate::value::Value;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesetDocument {
    version: String,
    #[serde(default)]
    parameters: BTreeMap<String, ParameterDocument>,
    rules: Vec<RuleDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BddDocument {
    #[serde(default)]
    parameters: BTreeMap<String, ParameterDocument>,
    #[serde(default)]
    conditions: Vec<ConditionDocument>,
    #[serde(default)]
    results: Vec<RuleDocument>,
    #[serde(default)]
    nodes: Vec<[i32; 3]>,
    root: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParameterDocument {
    #[serde(rename = "type")]
    parameter_type: String,
    #[serde(default)]
    required: bool,
    default: Option<Json>,
    built_in: Option<String>,
    documentation: Option<String>,
    deprecated: Option<DeprecatedDocument>,
}

#[derive(Deserialize)]
struct DeprecatedDocument {
    message: Option<String>,
    since: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RuleDocument {
    Tree {
        #[serde(default)]
        conditions: Vec<ConditionDocument>,
        rules: Vec<RuleDocument>,
        documentation: Option<String>,
    },
    Endpoint {
        #[serde(default)]
        conditions: Vec<ConditionDocument>,
        endpoint: EndpointDocument,
        documentation: Option<String>,
    },
    Error {
        #[serde(default)]
        conditions: Vec<ConditionDocument>,
        error: Json,
        documentation: Option<String>,
    },
}

#[derive(Deserialize)]
struct ConditionDocument {
    #[serde(rename = "fn")]
    function: String,
    #[serde(default)]
    argv: Vec<Json>,
    assign: Option<String>,
}

#[derive(Deserialize)]
struct EndpointDocument {
    url: Json,
    #[serde(default)]
    headers: BTreeMap<String, Vec<Json>>,
    #[serde(default)]
    properties: BTreeMap<String, Json>,
}

pub(crate) fn parse_ruleset(document: &str) -> Result<EndpointRuleset, RulesetError> {
    let document: RulesetDocument = serde_json::from_str(document)?;
    let mut builder = EndpointRuleset::builder().version(document.version);
    for parameter in parameters(document.parameters)? {
        builder = builder.parameter(parameter);
    }
    let rules = document
        .rules
        .into_iter()
        .map(rule)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(builder.rules(rules).build())
}

pub(crate) fn parse_bdd(document: &str) -> Result<EndpointBdd, RulesetError> {
    let document: BddDocument = serde_json::from_str(document)?;
    let conditions = conditions_of(document.conditions)?;
    let results = document
        .results
        .into_iter()
        .map(rule)
        .collect::<Result<Vec<_>, _>>()?;
    let nodes = document
        .nodes
        .into_iter()
        .enumerate()
        .map(|(index, [condition, high, low])| match usize::try_from(condition) {
            Ok(condition) => Ok(BddNode::new(condition, high, low)),
            // The terminal placeholder is conventionally written as `[-1, 1, -1]`.
            Err(_) if index == 0 => Ok(BddNode::new(0, high, low)),
            Err(_) => Err(RulesetError::Invalid(format!(
                "negative BDD condition index {condition}"
            ))),
        })
        .collect::<Result<Vec<_>, RulesetError>>()?;
    EndpointBdd::new(
        parameters(document.parameters)?.into_iter().collect(),
        conditions,
        results,
        nodes,
        document.root,
    )
}

fn parameters(
    documents: BTreeMap<String, ParameterDocument>,
) -> Result<Vec<Parameter>, RulesetError> {
    documents
        .into_iter()
        .map(|(name, document)| parameter(name, document))
        .collect()
}

fn parameter(name: String, document: ParameterDocument) -> Result<Parameter, RulesetError> {
    let parameter_type = ParameterType::from_name(&document.parameter_type).ok_or_else(|| {
        RulesetError::Invalid(format!(
            "parameter `{name}` has unknown type `{}`",
            document.parameter_type
        ))
    })?;
    let mut builder = Parameter::builder(name, parameter_type).required(document.required);
    if let Some(default) = document.default {
        builder = builder.default_value(default_value(default)?);
    }
    if let Some(built_in) = document.built_in {
        builder = builder.built_in(BuiltIn::from_tag(&built_in));
    }
    if let Some(documentation) = document.documentation {
        builder = builder.documentation(documentation);
    }
    if let Some(deprecated) = document.deprecated {
        builder = builder.deprecated(Deprecated::new(deprecated.message, deprecated.since));
    }
    builder.build()
}

fn default_value(json: Json) -> Result<Value, RulesetError> {
    match json {
        Json::Bool(b) => Ok(Value::Bool(b)),
        Json::String(s) => Ok(Value::String(s)),
        Json::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Json::String(s) => Ok(Value::String(s)),
                other => Err(RulesetError::Invalid(format!(
                    "array defaults may only contain strings, found `{other}`"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(RulesetError::Invalid(format!(
            "unsupported parameter default `{other}`"
        ))),
    }
}

fn rule(document: RuleDocument) -> Result<Rule, RulesetError> {
    let (rule, documentation) = match document {
        RuleDocument::Tree {
            conditions,
            rules,
            documentation,
        } => {
            let rules = rules.into_iter().map(rule).collect::<Result<_, _>>()?;
            (Rule::tree(conditions_of(conditions)?, rules), documentation)
        }
        RuleDocument::Endpoint {
            conditions,
            endpoint,
            documentation,
        } => (
            Rule::endpoint(conditions_of(conditions)?, endpoint_result(endpoint)?),
            documentation,
        ),
        RuleDocument::Error {
            conditions,
            error,
            documentation,
        } => (
            Rule::error(conditions_of(conditions)?, expr(error)?),
            documentation,
        ),
    };
    Ok(match documentation {
        Some(documentation) => rule.with_documentation(documentation),
        None => rule,
    })
}

fn conditions_of(documents: Vec<ConditionDocument>) -> Result<Vec<Condition>, RulesetError> {
    documents.into_iter().map(condition).collect()
}

fn condition(document: ConditionDocument) -> Result<Condition, RulesetError> {
    let condition = Condition::new(function(&document.function, document.argv)?);
    Ok(match document.assign {
        Some(name) => condition.assign(name),
        None => condition,
    })
}

fn function(name: &str, argv: Vec<Json>) -> Result<FnNode, RulesetError> {
    let args = argv.into_iter().map(expr).collect::<Result<Vec<_>, _>>()?;
    FnNode::from_name(name, args)
}

fn endpoint_result(document: EndpointDocument) -> Result<EndpointResult, RulesetError> {
    let mut builder = EndpointResult::builder().url(expr(document.url)?);
    for (name, values) in document.headers {
        for value in values {
            builder = builder.header(name.clone(), expr(value)?);
        }
    }
    for (name, value) in document.properties {
        builder = builder.property(name, literal(value)?);
    }
    builder.build()
}

fn expr(json: Json) -> Result<Expr, RulesetError> {
    match json {
        Json::Object(mut object) => {
            if let Some(reference) = object.remove("ref") {
                return match reference {
                    Json::String(name) => Ok(Expr::reference(name)),
                    other => Err(RulesetError::Invalid(format!(
                        "`ref` must name a parameter or binding, found `{other}`"
                    ))),
                };
            }
            if let Some(name) = object.remove("fn") {
                let name = match name {
                    Json::String(name) => name,
                    other => {
                        return Err(RulesetError::Invalid(format!(
                            "`fn` must be a function name, found `{other}`"
                        )))
                    }
                };
                let argv = match object.remove("argv") {
                    Some(Json::Array(argv)) => argv,
                    None => Vec::new(),
                    Some(other) => {
                        return Err(RulesetError::Invalid(format!(
                            "`argv` must be an array, found `{other}`"
                        )))
                    }
                };
                return Ok(Expr::Fn(function(&name, argv)?));
            }
            literal(Json::Object(object)).map(Expr::Literal)
        }
        other => literal(other).map(Expr::Literal),
    }
}

fn literal(json: Json) -> Result<Literal, RulesetError> {
    match json {
        Json::String(template) => Literal::string(&template),
        Json::Bool(b) => Ok(Literal::Bool(b)),
        Json::Number(number) => number
            .as_i64()
            .map(Literal::Int)
            .ok_or_else(|| RulesetError::Invalid(format!("`{number}` is not an integer"))),
        Json::Array(items) => items
            .into_iter()
            .map(literal)
            .collect::<Result<Vec<_>, _>>()
            .map(Literal::Tuple),
        Json::Object(fields) => fields
            .into_iter()
            .map(|(name, value)| Ok((Identifier::from(name), literal(value)?)))
            .collect::<Result<Vec<_>, RulesetError>>()
            .map(Literal::Record),
        Json::Null => Err(RulesetError::Invalid("`null` is not a valid literal".into())),
    }
}
