/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Typed view of the `authSchemes` endpoint property.

use crate::endpoint::Endpoint;
use crate::error::EvaluationError;
use crate::identifier::Identifier;
use crate::value::Value;
use std::collections::HashMap;

/// An auth scheme advertised by a resolved endpoint.
///
/// Endpoint rules use this to override the signing name and region that signing would
/// otherwise derive from the client configuration.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// AWS Signature Version 4
    SigV4 {
        /// Overrides the service signing name
        signing_name: Option<String>,
        /// Overrides the signing region
        signing_region: Option<String>,
        /// When set, the path is not double-encoded during signing
        disable_double_encoding: Option<bool>,
    },
    /// AWS Signature Version 4a (multi-region)
    SigV4a {
        /// Overrides the service signing name
        signing_name: Option<String>,
        /// Regions the signature is valid for
        signing_region_set: Vec<String>,
        /// When set, the path is not double-encoded during signing
        disable_double_encoding: Option<bool>,
    },
    /// S3 Express One Zone session auth
    SigV4S3Express {
        /// Overrides the service signing name
        signing_name: Option<String>,
        /// Overrides the signing region
        signing_region: Option<String>,
        /// When set, the path is not double-encoded during signing
        disable_double_encoding: Option<bool>,
    },
    /// A scheme this crate does not model
    Unknown(String),
}

impl AuthScheme {
    /// The scheme name as it appears in rule sets
    pub fn name(&self) -> &str {
        match self {
            AuthScheme::SigV4 { .. } => "sigv4",
            AuthScheme::SigV4a { .. } => "sigv4a",
            AuthScheme::SigV4S3Express { .. } => "sigv4-s3express",
            AuthScheme::Unknown(name) => name,
        }
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, EvaluationError> {
        let fields = value.expect_record()?;
        let name = field(fields, "name")?
            .ok_or_else(|| EvaluationError::InvalidArgument("auth scheme has no `name`".into()))?;
        Ok(match name {
            "sigv4" => AuthScheme::SigV4 {
                signing_name: field(fields, "signingName")?.map(str::to_string),
                signing_region: field(fields, "signingRegion")?.map(str::to_string),
                disable_double_encoding: flag(fields, "disableDoubleEncoding")?,
            },
            "sigv4a" => AuthScheme::SigV4a {
                signing_name: field(fields, "signingName")?.map(str::to_string),
                signing_region_set: match fields.get("signingRegionSet") {
                    None | Some(Value::None) => Vec::new(),
                    Some(set) => set
                        .expect_array()?
                        .iter()
                        .map(|region| region.expect_string().map(str::to_string))
                        .collect::<Result<_, _>>()?,
                },
                disable_double_encoding: flag(fields, "disableDoubleEncoding")?,
            },
            "sigv4-s3express" => AuthScheme::SigV4S3Express {
                signing_name: field(fields, "signingName")?.map(str::to_string),
                signing_region: field(fields, "signingRegion")?.map(str::to_string),
                disable_double_encoding: flag(fields, "disableDoubleEncoding")?,
            },
            other => AuthScheme::Unknown(other.to_string()),
        })
    }
}

fn field<'a>(
    fields: &'a HashMap<Identifier, Value>,
    name: &str,
) -> Result<Option<&'a str>, EvaluationError> {
    match fields.get(name) {
        None | Some(Value::None) => Ok(None),
        Some(value) => value.expect_string().map(Some),
    }
}

fn flag(fields: &HashMap<Identifier, Value>, name: &str) -> Result<Option<bool>, EvaluationError> {
    match fields.get(name) {
        None | Some(Value::None) => Ok(None),
        Some(value) => value.expect_bool().map(Some),
    }
}

/// Signing overrides derived from an endpoint.
///
/// Taken from the first SigV4-family auth scheme the endpoint lists. Either field may be unset,
/// in which case signing falls back to the client's region and the service's signing name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialScope {
    region: Option<String>,
    service: Option<String>,
}

impl CredentialScope {
    /// Signing region override
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Signing name override
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }
}

impl Endpoint {
    /// Returns the signing overrides of this endpoint.
    pub fn credential_scope(&self) -> Result<CredentialScope, EvaluationError> {
        for scheme in self.auth_schemes()? {
            match scheme {
                AuthScheme::SigV4 {
                    signing_name,
                    signing_region,
                    ..
                }
                | AuthScheme::SigV4S3Express {
                    signing_name,
                    signing_region,
                    ..
                } => {
                    return Ok(CredentialScope {
                        region: signing_region,
                        service: signing_name,
                    })
                }
                AuthScheme::SigV4a { signing_name, .. } => {
                    return Ok(CredentialScope {
                        region: None,
                        service: signing_name,
                    })
                }
                AuthScheme::Unknown(name) => {
                    tracing::debug!(scheme = %name, "skipping unknown auth scheme");
                }
            }
        }
        Ok(CredentialScope::default())
    }
}

#[cfg(test)]
mod test {
    use super::{AuthScheme, CredentialScope};
    use crate::endpoint::{Endpoint, AUTH_SCHEMES};
    use crate::value::Value;

    fn endpoint_with(schemes: Vec<Value>) -> Endpoint {
        Endpoint::builder()
            .url("https://service.us-east-1.amazonaws.com")
            .property(AUTH_SCHEMES, schemes)
            .build()
    }

    #[test]
    fn sets_service_override_when_set() {
        let endpoint = endpoint_with(vec![Value::record([
            ("name", Value::from("sigv4")),
            ("signingName", Value::from("qldb-override")),
            ("signingRegion", Value::from("us-east-override")),
        ])]);
        let scope = endpoint.credential_scope().unwrap();
        assert_eq!(scope.region(), Some("us-east-override"));
        assert_eq!(scope.service(), Some("qldb-override"));
    }

    #[test]
    fn unknown_schemes_are_skipped() {
        let endpoint = endpoint_with(vec![
            Value::record([("name", "sigv5")]),
            Value::record([
                ("name", Value::from("sigv4")),
                ("signingRegion", Value::from("us-west-2")),
            ]),
        ]);
        let schemes = endpoint.auth_schemes().unwrap();
        assert_eq!(schemes[0], AuthScheme::Unknown("sigv5".into()));
        assert_eq!(endpoint.credential_scope().unwrap().region(), Some("us-west-2"));
    }

    #[test]
    fn no_schemes_means_no_overrides() {
        let endpoint = Endpoint::builder().url("https://example.com").build();
        assert_eq!(endpoint.credential_scope().unwrap(), CredentialScope::default());
    }

    #[test]
    fn disable_double_encoding_must_be_bool() {
        let endpoint = endpoint_with(vec![Value::record([
            ("name", "sigv4"),
            ("disableDoubleEncoding", "true"),
        ])]);
        assert!(endpoint.auth_schemes().is_err());

        let endpoint = endpoint_with(vec![Value::record([
            ("name", Value::from("sigv4")),
            ("disableDoubleEncoding", Value::from(true)),
        ])]);
        assert_eq!(
            endpoint.auth_schemes().unwrap(),
            vec![AuthScheme::SigV4 {
                signing_name: None,
                signing_region: None,
                disable_double_encoding: Some(true),
            }]
        );
    }
}
