/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The built-in function library.

use crate::endpoint_lib::arn::parse_arn;
use crate::endpoint_lib::host::is_valid_host_label;
use crate::endpoint_lib::parse_url::parse_url;
use crate::endpoint_lib::s3::is_virtual_hostable_s3_bucket;
use crate::endpoint_lib::split::split;
use crate::endpoint_lib::substring::substring;
use crate::endpoint_lib::uri_encode::uri_encode;
use crate::error::{EvaluationError, RulesetError};
use crate::expr::{EvalContext, Expr, Literal};
use crate::path::AttrPath;
use crate::scope::Scope;
use crate::value::Value;
use std::fmt::{Display, Formatter};

/// A built-in function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Function {
    /// `isSet(value)`: whether `value` is not `None`
    IsSet,
    /// `not(bool)`
    Not,
    /// `booleanEquals(bool, bool)`
    BooleanEquals,
    /// `stringEquals(string, string)`, case-sensitive
    StringEquals,
    /// `getAttr(value, "path")`: record field and array index projection
    GetAttr,
    /// `parseURL(string)`
    ParseUrl,
    /// `substring(string, start, stop, reverse)`
    Substring,
    /// `uriEncode(string)`
    UriEncode,
    /// `isValidHostLabel(string, allowDots)`
    IsValidHostLabel,
    /// `split(string, delimiter, limit)`
    Split,
    /// `coalesce(a, b, ...)`: the first argument that is not `None`
    Coalesce,
    /// `ite(bool, a, b)`: `a` if the condition holds, else `b`
    Ite,
    /// `aws.partition(region)`
    AwsPartition,
    /// `aws.parseArn(string)`
    AwsParseArn,
    /// `aws.isVirtualHostableS3Bucket(string, allowDots)`
    AwsIsVirtualHostableS3Bucket,
}

const FUNCTIONS: [Function; 15] = [
    Function::IsSet,
    Function::Not,
    Function::BooleanEquals,
    Function::StringEquals,
    Function::GetAttr,
    Function::ParseUrl,
    Function::Substring,
    Function::UriEncode,
    Function::IsValidHostLabel,
    Function::Split,
    Function::Coalesce,
    Function::Ite,
    Function::AwsPartition,
    Function::AwsParseArn,
    Function::AwsIsVirtualHostableS3Bucket,
];

impl Function {
    /// Looks a function up by the name used in rule sets.
    pub fn from_name(name: &str) -> Option<Self> {
        FUNCTIONS.into_iter().find(|function| function.name() == name)
    }

    /// The name used in rule sets
    pub fn name(&self) -> &'static str {
        match self {
            Function::IsSet => "isSet",
            Function::Not => "not",
            Function::BooleanEquals => "booleanEquals",
            Function::StringEquals => "stringEquals",
            Function::GetAttr => "getAttr",
            Function::ParseUrl => "parseURL",
            Function::Substring => "substring",
            Function::UriEncode => "uriEncode",
            Function::IsValidHostLabel => "isValidHostLabel",
            Function::Split => "split",
            Function::Coalesce => "coalesce",
            Function::Ite => "ite",
            Function::AwsPartition => "aws.partition",
            Function::AwsParseArn => "aws.parseArn",
            Function::AwsIsVirtualHostableS3Bucket => "aws.isVirtualHostableS3Bucket",
        }
    }

    /// Number of arguments the function accepts
    pub fn arity(&self) -> Arity {
        match self {
            Function::IsSet
            | Function::Not
            | Function::ParseUrl
            | Function::UriEncode
            | Function::AwsPartition
            | Function::AwsParseArn => Arity::Exactly(1),
            Function::BooleanEquals
            | Function::StringEquals
            | Function::GetAttr
            | Function::IsValidHostLabel
            | Function::AwsIsVirtualHostableS3Bucket => Arity::Exactly(2),
            Function::Split | Function::Ite => Arity::Exactly(3),
            Function::Substring => Arity::Exactly(4),
            Function::Coalesce => Arity::AtLeast(2),
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of arguments accepted by a [`Function`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many
    Exactly(usize),
    /// This many or more
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// A function applied to its arguments.
///
/// Arity is checked on construction, so evaluation never sees a malformed call. The path
/// argument of `getAttr` must be a string literal and is parsed up front.
#[derive(Clone, Debug, PartialEq)]
pub struct FnNode {
    function: Function,
    args: Vec<Expr>,
    path: Option<AttrPath>,
}

impl FnNode {
    /// Creates a call of `function`.
    pub fn new(function: Function, args: Vec<Expr>) -> Result<Self, RulesetError> {
        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(RulesetError::Arity {
                name: function.name(),
                expected: arity,
                found: args.len(),
            });
        }
        let path = match function {
            Function::GetAttr => Some(static_path(&args[1])?),
            _ => None,
        };
        Ok(Self {
            function,
            args,
            path,
        })
    }

    /// Creates a call of the function named `name`.
    pub fn from_name(name: &str, args: Vec<Expr>) -> Result<Self, RulesetError> {
        let function = Function::from_name(name)
            .ok_or_else(|| RulesetError::UnknownFunction(name.to_string()))?;
        Self::new(function, args)
    }

    /// The function being called
    pub fn function(&self) -> Function {
        self.function
    }

    /// The arguments of the call
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    /// Evaluates the arguments left to right, then applies the function.
    ///
    /// Errors raised while checking this function's arguments are reported as
    /// `while evaluating <name>: ...`.
    pub(crate) fn eval(
        &self,
        scope: &Scope<'_>,
        ctx: &mut EvalContext<'_>,
    ) -> Result<Value, EvaluationError> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.eval(scope, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        self.apply(&args, ctx)
            .map_err(|err| err.in_function(self.function.name()))
    }

    fn apply(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Result<Value, EvaluationError> {
        let e = &mut ctx.diagnostics;
        Ok(match self.function {
            Function::IsSet => Value::Bool(!args[0].is_none()),
            Function::Not => Value::Bool(!args[0].expect_bool()?),
            Function::BooleanEquals => {
                Value::Bool(args[0].expect_bool()? == args[1].expect_bool()?)
            }
            Function::StringEquals => {
                Value::Bool(args[0].expect_string()? == args[1].expect_string()?)
            }
            Function::GetAttr => match &self.path {
                Some(path) => path.apply(&args[0])?,
                None => {
                    return Err(EvaluationError::InvalidArgument(
                        "getAttr requires a path".into(),
                    ))
                }
            },
            Function::ParseUrl => match parse_url(args[0].expect_string()?, e) {
                Some(url) => Value::record([
                    ("scheme", Value::from(url.scheme())),
                    ("authority", Value::from(url.authority())),
                    ("path", Value::from(url.path())),
                    ("normalizedPath", Value::from(url.normalized_path().into_owned())),
                    ("isIp", Value::Bool(url.is_ip())),
                ]),
                None => Value::None,
            },
            Function::Substring => {
                let input = args[0].expect_string()?;
                let start = index(&args[1], "start")?;
                let stop = index(&args[2], "stop")?;
                let reverse = args[3].expect_bool()?;
                substring(input, start, stop, reverse, e).into()
            }
            Function::UriEncode => {
                Value::String(uri_encode(args[0].expect_string()?, e).into_owned())
            }
            Function::IsValidHostLabel => Value::Bool(is_valid_host_label(
                args[0].expect_string()?,
                args[1].expect_bool()?,
                e,
            )),
            Function::Split => {
                let value = args[0].expect_string()?;
                let delimiter = args[1].expect_string()?;
                let limit = index(&args[2], "limit")?;
                split(value, delimiter, limit, e)
                    .map(|parts| Value::Array(parts.into_iter().map(Value::from).collect()))
                    .into()
            }
            Function::Coalesce => args
                .iter()
                .find(|arg| !arg.is_none())
                .cloned()
                .unwrap_or(Value::None),
            Function::Ite => {
                if args[0].expect_bool()? {
                    args[1].clone()
                } else {
                    args[2].clone()
                }
            }
            Function::AwsPartition => ctx
                .partitions
                .resolve_partition(args[0].expect_string()?, e)
                .map(Value::from)
                .into(),
            Function::AwsParseArn => parse_arn(args[0].expect_string()?, e)
                .map(Value::from)
                .into(),
            Function::AwsIsVirtualHostableS3Bucket => Value::Bool(is_virtual_hostable_s3_bucket(
                args[0].expect_string()?,
                args[1].expect_bool()?,
                e,
            )),
        })
    }
}

impl Display for FnNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.function)?;
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

fn static_path(arg: &Expr) -> Result<AttrPath, RulesetError> {
    match arg {
        Expr::Literal(Literal::Str(template)) => match template.as_static() {
            Some(path) => AttrPath::parse(path),
            None => Err(RulesetError::Invalid(
                "the path of getAttr cannot contain placeholders".into(),
            )),
        },
        _ => Err(RulesetError::Invalid(
            "the path of getAttr must be a string literal".into(),
        )),
    }
}

fn index(value: &Value, name: &str) -> Result<usize, EvaluationError> {
    let index = value.expect_integer()?;
    usize::try_from(index).map_err(|_| {
        EvaluationError::InvalidArgument(format!("{name} must not be negative, found {index}"))
    })
}
