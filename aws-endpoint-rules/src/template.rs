/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{EvaluationError, RulesetError};
use crate::identifier::Identifier;
use crate::path::AttrPath;
use crate::scope::Scope;
use crate::value::Value;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
enum TemplatePart {
    Static(String),
    Placeholder {
        name: Identifier,
        path: Option<AttrPath>,
    },
}

/// A string with `{Name}` and `{Name#path}` placeholders.
///
/// `{{` and `}}` produce literal braces. Every placeholder must evaluate to a string.
///
/// ```
/// use aws_endpoint_rules::Template;
///
/// let template = Template::parse("https://{Bucket}.s3.{PartitionResult#dnsSuffix}").unwrap();
/// assert!(template.as_static().is_none());
/// assert_eq!(Template::parse("{{literal}}").unwrap().as_static(), Some("{literal}"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Parses a template.
    pub fn parse(template: &str) -> Result<Self, RulesetError> {
        let error = |message| RulesetError::InvalidTemplate {
            template: template.to_string(),
            message,
        };
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = template.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.as_str().starts_with('{') => {
                    chars.next();
                    current.push('{');
                }
                '}' if chars.as_str().starts_with('}') => {
                    chars.next();
                    current.push('}');
                }
                '}' => return Err(error("unmatched `}`")),
                '{' => {
                    let rest = chars.as_str();
                    let end = rest.find('}').ok_or_else(|| error("unclosed placeholder"))?;
                    let placeholder = &rest[..end];
                    if placeholder.contains('{') {
                        return Err(error("nested `{` in placeholder"));
                    }
                    let (name, path) = match placeholder.split_once('#') {
                        Some((name, path)) => (name, Some(AttrPath::parse(path)?)),
                        None => (placeholder, None),
                    };
                    if name.is_empty() {
                        return Err(error("empty placeholder"));
                    }
                    if !current.is_empty() {
                        parts.push(TemplatePart::Static(std::mem::take(&mut current)));
                    }
                    parts.push(TemplatePart::Placeholder {
                        name: Identifier::new(name.to_string()),
                        path,
                    });
                    chars = rest[end + 1..].chars();
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() || parts.is_empty() {
            parts.push(TemplatePart::Static(current));
        }
        Ok(Self { parts })
    }

    /// Returns the text of a template without placeholders.
    pub fn as_static(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [TemplatePart::Static(text)] => Some(text),
            _ => None,
        }
    }

    pub(crate) fn render(&self, scope: &Scope<'_>) -> Result<String, EvaluationError> {
        if let Some(text) = self.as_static() {
            return Ok(text.to_string());
        }
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Static(text) => out.push_str(text),
                TemplatePart::Placeholder { name, path } => {
                    let value = scope.resolve(name.as_str());
                    let value = match path {
                        Some(path) => path.apply(&value)?,
                        None => value,
                    };
                    out.push_str(value.expect_string()?);
                }
            }
        }
        Ok(out)
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for part in &self.parts {
            match part {
                TemplatePart::Static(text) => {
                    write!(f, "{}", text.replace('{', "{{").replace('}', "}}"))?
                }
                TemplatePart::Placeholder { name, path: None } => write!(f, "{{{name}}}")?,
                TemplatePart::Placeholder {
                    name,
                    path: Some(path),
                } => write!(f, "{{{name}#{path}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Template;
    use crate::error::{EvaluationError, RulesetError};
    use crate::identifier::Identifier;
    use crate::scope::Scope;
    use crate::value::Value;

    fn scope() -> Scope<'static> {
        let mut scope = Scope::new();
        scope.insert(Identifier::from_static("Region"), "us-west-2".into());
        scope.insert(
            Identifier::from_static("PartitionResult"),
            Value::record([("dnsSuffix", "amazonaws.com")]),
        );
        scope.insert(Identifier::from_static("UseFIPS"), true.into());
        scope
    }

    fn render(template: &str) -> Result<String, EvaluationError> {
        Template::parse(template).unwrap().render(&scope())
    }

    #[test]
    fn substitutes_placeholders() {
        assert_eq!(
            render("https://acm.{Region}.{PartitionResult#dnsSuffix}").unwrap(),
            "https://acm.us-west-2.amazonaws.com"
        );
        assert_eq!(render("{Region}").unwrap(), "us-west-2");
        assert_eq!(render("").unwrap(), "");
    }

    #[test]
    fn escaped_braces() {
        assert_eq!(render("{{Region}}").unwrap(), "{Region}");
        assert_eq!(render("a{{{Region}}}b").unwrap(), "a{us-west-2}b");
    }

    #[test]
    fn placeholders_must_be_strings() {
        assert!(matches!(
            render("{UseFIPS}"),
            Err(EvaluationError::UnexpectedType { expected: "string", found: "bool" })
        ));
        assert!(matches!(
            render("{Unset}"),
            Err(EvaluationError::UnexpectedType { found: "none", .. })
        ));
        assert!(render("{PartitionResult#missing}").is_err());
    }

    #[test]
    fn display_reproduces_the_source() {
        for template in ["https://{Region}.{PartitionResult#dnsSuffix}", "{{x}}", "plain"] {
            assert_eq!(Template::parse(template).unwrap().to_string(), template);
        }
    }

    #[test]
    fn malformed_templates() {
        for template in ["{Region", "Region}", "{}", "{#dnsSuffix}", "{a{b}", "{a#}"] {
            assert!(
                matches!(
                    Template::parse(template),
                    Err(RulesetError::InvalidTemplate { .. } | RulesetError::InvalidPath(_))
                ),
                "{template} should be rejected"
            );
        }
    }
}
