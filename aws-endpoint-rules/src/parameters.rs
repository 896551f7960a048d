/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The parameter schema of a rule set.

use crate::config::EndpointConfig;
use crate::error::{EvaluationError, RulesetError};
use crate::identifier::Identifier;
use crate::resolver::Params;
use crate::scope::Scope;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Declared type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterType {
    /// A string
    String,
    /// A boolean
    Boolean,
    /// An array of strings
    StringArray,
}

impl ParameterType {
    /// The type name used in rule sets
    pub fn name(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::Boolean => "Boolean",
            ParameterType::StringArray => "StringArray",
        }
    }

    /// Parses a type name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            ParameterType::String,
            ParameterType::Boolean,
            ParameterType::StringArray,
        ]
        .into_iter()
        .find(|ty| ty.name().eq_ignore_ascii_case(name))
    }

    /// Whether `value` is of this type
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (ParameterType::String, Value::String(_)) => true,
            (ParameterType::Boolean, Value::Bool(_)) => true,
            (ParameterType::StringArray, Value::Array(items)) => {
                items.iter().all(|item| matches!(item, Value::String(_)))
            }
            _ => false,
        }
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the SDK sources a parameter from, independent of any operation input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BuiltIn {
    /// `AWS::Region`
    Region,
    /// `AWS::UseFIPS`
    UseFips,
    /// `AWS::UseDualStack`
    UseDualStack,
    /// `SDK::Endpoint`, a custom endpoint URL
    Endpoint,
    /// `AWS::Auth::AccountId`
    AccountId,
    /// `AWS::Auth::AccountIdEndpointMode`
    AccountIdEndpointMode,
    /// `AWS::S3::Accelerate`
    S3Accelerate,
    /// `AWS::S3::ForcePathStyle`
    S3ForcePathStyle,
    /// `AWS::S3::UseArnRegion`
    S3UseArnRegion,
    /// `AWS::S3::UseGlobalEndpoint`
    S3UseGlobalEndpoint,
    /// `AWS::S3::DisableMultiRegionAccessPoints`
    S3DisableMultiRegionAccessPoints,
    /// `AWS::S3Control::UseArnRegion`
    S3ControlUseArnRegion,
    /// `AWS::STS::UseGlobalEndpoint`
    StsUseGlobalEndpoint,
    /// A tag this crate does not know how to source
    Other(String),
}

const KNOWN_BUILT_INS: [BuiltIn; 13] = [
    BuiltIn::Region,
    BuiltIn::UseFips,
    BuiltIn::UseDualStack,
    BuiltIn::Endpoint,
    BuiltIn::AccountId,
    BuiltIn::AccountIdEndpointMode,
    BuiltIn::S3Accelerate,
    BuiltIn::S3ForcePathStyle,
    BuiltIn::S3UseArnRegion,
    BuiltIn::S3UseGlobalEndpoint,
    BuiltIn::S3DisableMultiRegionAccessPoints,
    BuiltIn::S3ControlUseArnRegion,
    BuiltIn::StsUseGlobalEndpoint,
];

impl BuiltIn {
    /// Parses a `builtIn` tag.
    pub fn from_tag(tag: &str) -> Self {
        KNOWN_BUILT_INS
            .into_iter()
            .find(|built_in| built_in.tag() == tag)
            .unwrap_or_else(|| BuiltIn::Other(tag.to_string()))
    }

    /// The tag used in rule sets
    pub fn tag(&self) -> &str {
        match self {
            BuiltIn::Region => "AWS::Region",
            BuiltIn::UseFips => "AWS::UseFIPS",
            BuiltIn::UseDualStack => "AWS::UseDualStack",
            BuiltIn::Endpoint => "SDK::Endpoint",
            BuiltIn::AccountId => "AWS::Auth::AccountId",
            BuiltIn::AccountIdEndpointMode => "AWS::Auth::AccountIdEndpointMode",
            BuiltIn::S3Accelerate => "AWS::S3::Accelerate",
            BuiltIn::S3ForcePathStyle => "AWS::S3::ForcePathStyle",
            BuiltIn::S3UseArnRegion => "AWS::S3::UseArnRegion",
            BuiltIn::S3UseGlobalEndpoint => "AWS::S3::UseGlobalEndpoint",
            BuiltIn::S3DisableMultiRegionAccessPoints => "AWS::S3::DisableMultiRegionAccessPoints",
            BuiltIn::S3ControlUseArnRegion => "AWS::S3Control::UseArnRegion",
            BuiltIn::StsUseGlobalEndpoint => "AWS::STS::UseGlobalEndpoint",
            BuiltIn::Other(tag) => tag,
        }
    }
}

/// Deprecation notice of a parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deprecated {
    message: Option<String>,
    since: Option<String>,
}

impl Deprecated {
    /// Creates a deprecation notice.
    pub fn new(message: Option<String>, since: Option<String>) -> Self {
        Self { message, since }
    }

    /// Explanation or replacement
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// When the parameter was deprecated
    pub fn since(&self) -> Option<&str> {
        self.since.as_deref()
    }
}

/// A declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: Identifier,
    parameter_type: ParameterType,
    required: bool,
    default: Option<Value>,
    built_in: Option<BuiltIn>,
    documentation: Option<String>,
    deprecated: Option<Deprecated>,
}

impl Parameter {
    /// Creates a builder for an optional parameter without a default.
    pub fn builder(name: impl Into<Identifier>, parameter_type: ParameterType) -> ParameterBuilder {
        ParameterBuilder {
            name: name.into(),
            parameter_type,
            required: false,
            default: None,
            built_in: None,
            documentation: None,
            deprecated: None,
        }
    }

    /// Parameter name
    pub fn name(&self) -> &Identifier {
        &self.name
    }

    /// Declared type
    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    /// Whether resolution fails when the parameter is unset
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Value used when the caller does not set one
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Built-in source of this parameter
    pub fn built_in(&self) -> Option<&BuiltIn> {
        self.built_in.as_ref()
    }

    /// Documentation
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Deprecation notice
    pub fn deprecated(&self) -> Option<&Deprecated> {
        self.deprecated.as_ref()
    }
}

/// Builder for [`Parameter`]
#[derive(Clone, Debug)]
pub struct ParameterBuilder {
    name: Identifier,
    parameter_type: ParameterType,
    required: bool,
    default: Option<Value>,
    built_in: Option<BuiltIn>,
    documentation: Option<String>,
    deprecated: Option<Deprecated>,
}

impl ParameterBuilder {
    /// Marks the parameter as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the built-in source.
    pub fn built_in(mut self, built_in: BuiltIn) -> Self {
        self.built_in = Some(built_in);
        self
    }

    /// Sets documentation.
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Marks the parameter deprecated.
    pub fn deprecated(mut self, deprecated: Deprecated) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Constructs the [`Parameter`], checking that the default matches the declared type.
    pub fn build(self) -> Result<Parameter, RulesetError> {
        if let Some(default) = &self.default {
            if !self.parameter_type.matches(default) {
                return Err(RulesetError::Invalid(format!(
                    "default of parameter `{}` must be {} but was {}",
                    self.name,
                    self.parameter_type,
                    default.type_name()
                )));
            }
        }
        Ok(Parameter {
            name: self.name,
            parameter_type: self.parameter_type,
            required: self.required,
            default: self.default,
            built_in: self.built_in,
            documentation: self.documentation,
            deprecated: self.deprecated,
        })
    }
}

/// The ordered parameter declarations of a rule set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    parameters: Vec<Parameter>,
}

impl Parameters {
    /// Creates a schema from declarations.
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Declarations in order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// A single declaration
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name.as_str() == name)
    }

    /// Fills every parameter whose built-in source is set in `config`.
    pub fn params_from_config(&self, config: &EndpointConfig) -> Params {
        let mut params = Params::builder();
        for parameter in &self.parameters {
            let value = parameter
                .built_in
                .as_ref()
                .and_then(|built_in| config.built_in_value(built_in));
            if let Some(value) = value {
                params = params.set(parameter.name.clone(), value);
            }
        }
        params.build()
    }

    /// Builds the root scope of an evaluation from caller-provided values.
    ///
    /// Unset values take their declared default; a required parameter that is still unset, or a
    /// value of the wrong type, fails before any rule runs. Undeclared inputs are ignored.
    pub(crate) fn bind(
        &self,
        input: &HashMap<Identifier, Value>,
    ) -> Result<Scope<'static>, EvaluationError> {
        for name in input.keys() {
            if self.get(name.as_str()).is_none() {
                tracing::debug!(parameter = %name, "ignoring undeclared endpoint parameter");
            }
        }
        let mut bindings = HashMap::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            let provided = input.get(&parameter.name).filter(|value| !value.is_none());
            let value = match (provided, &parameter.default) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.clone(),
                (None, None) if parameter.required => {
                    return Err(EvaluationError::MissingParameter(parameter.name.clone()))
                }
                (None, None) => continue,
            };
            if !parameter.parameter_type.matches(&value) {
                return Err(EvaluationError::InvalidParameter {
                    name: parameter.name.clone(),
                    expected: parameter.parameter_type.name(),
                    found: value.type_name(),
                });
            }
            if let (Some(deprecated), Some(_)) = (&parameter.deprecated, provided) {
                tracing::warn!(
                    parameter = %parameter.name,
                    since = deprecated.since().unwrap_or("unknown"),
                    message = deprecated.message().unwrap_or_default(),
                    "deprecated endpoint parameter was set"
                );
            }
            bindings.insert(parameter.name.clone(), value);
        }
        Ok(Scope::from_bindings(bindings))
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<T: IntoIterator<Item = Parameter>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
