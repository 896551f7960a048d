/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{EvaluationError, RulesetError};
use crate::identifier::Identifier;
use crate::value::Value;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
enum PathPart {
    Key(Identifier),
    Index(usize),
}

/// A projection into records and arrays, as used by `getAttr` and `{Name#path}` templates.
///
/// Paths are `.`-separated field names, each optionally followed by an index:
/// `dnsSuffix`, `resourceId[1]`, `a.b[0]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrPath {
    parts: Vec<PathPart>,
}

impl AttrPath {
    /// Parses a path.
    pub fn parse(path: &str) -> Result<Self, RulesetError> {
        let invalid = || RulesetError::InvalidPath(path.to_string());
        let mut parts = Vec::new();
        for segment in path.split('.') {
            let (key, index) = match segment.split_once('[') {
                Some((key, rest)) => {
                    let index = rest
                        .strip_suffix(']')
                        .and_then(|index| index.parse::<usize>().ok())
                        .ok_or_else(invalid)?;
                    (key, Some(index))
                }
                None => (segment, None),
            };
            if !key.is_empty() {
                parts.push(PathPart::Key(Identifier::new(key.to_string())));
            } else if index.is_none() {
                return Err(invalid());
            }
            if let Some(index) = index {
                parts.push(PathPart::Index(index));
            }
        }
        Ok(Self { parts })
    }

    /// Projects `value` along this path.
    ///
    /// A missing field or an out-of-range index yields [`Value::None`], as does projecting
    /// from `None`. Projecting a field out of anything but a record (or an index out of
    /// anything but an array) is a type error.
    pub fn apply(&self, value: &Value) -> Result<Value, EvaluationError> {
        let mut current = value;
        for part in &self.parts {
            if current.is_none() {
                return Ok(Value::None);
            }
            let next = match part {
                PathPart::Key(key) => current.expect_record()?.get(key.as_str()),
                PathPart::Index(index) => current.expect_array()?.get(*index),
            };
            match next {
                Some(next) => current = next,
                None => return Ok(Value::None),
            }
        }
        Ok(current.clone())
    }
}

impl Display for AttrPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            match part {
                PathPart::Key(key) if idx == 0 => write!(f, "{key}")?,
                PathPart::Key(key) => write!(f, ".{key}")?,
                PathPart::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::AttrPath;
    use crate::value::Value;

    fn arn_record() -> Value {
        Value::record([
            ("service", Value::from("s3")),
            (
                "resourceId",
                Value::Array(vec![Value::from("outpost"), Value::from("op-01")]),
            ),
            ("nested", Value::record([("inner", vec![Value::from(true)])])),
        ])
    }

    #[test]
    fn parse_and_display() {
        for path in ["service", "resourceId[1]", "nested.inner[0]", "[3]"] {
            assert_eq!(AttrPath::parse(path).unwrap().to_string(), path);
        }
    }

    #[test]
    fn invalid_paths() {
        for path in ["", "a..b", "a[", "a[x]", "a[1", "a[-1]", "a."] {
            assert!(AttrPath::parse(path).is_err(), "{path} should be rejected");
        }
    }

    #[test]
    fn projection() {
        let record = arn_record();
        let get = |path: &str| AttrPath::parse(path).unwrap().apply(&record).unwrap();
        assert_eq!(get("service"), Value::from("s3"));
        assert_eq!(get("resourceId[1]"), Value::from("op-01"));
        assert_eq!(get("resourceId[2]"), Value::None);
        assert_eq!(get("missing"), Value::None);
        assert_eq!(get("missing.deeper"), Value::None);
        assert_eq!(get("nested.inner[0]"), Value::Bool(true));
    }

    #[test]
    fn projecting_through_scalars_is_a_type_error() {
        let record = arn_record();
        assert!(AttrPath::parse("service.name").unwrap().apply(&record).is_err());
        assert!(AttrPath::parse("service[0]").unwrap().apply(&record).is_err());
    }
}
