/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The resolved endpoint produced by endpoint rules.

use crate::auth::AuthScheme;
use crate::error::EvaluationError;
use crate::value::Value;
use std::collections::HashMap;

/// Property carrying the list of auth schemes an endpoint supports.
pub const AUTH_SCHEMES: &str = "authSchemes";

/// A resolved endpoint: a URL, headers to set on the request, and free-form properties.
///
/// Properties are not interpreted by the engine. The only one with a well known shape is
/// [`AUTH_SCHEMES`], see [`Endpoint::auth_schemes`].
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    url: String,
    headers: HashMap<String, Vec<String>>,
    properties: HashMap<String, Value>,
}

impl Endpoint {
    /// Creates a builder for an [`Endpoint`].
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The URL of this endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers required by this endpoint
    pub fn headers(&self) -> impl Iterator<Item = (&str, impl Iterator<Item = &str>)> {
        self.headers
            .iter()
            .map(|(name, values)| (name.as_str(), values.iter().map(String::as_str)))
    }

    /// Values of a single header, if it is set
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers.get(name).map(Vec::as_slice)
    }

    /// Properties of this endpoint
    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// A single property, if it is set
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Parses the [`AUTH_SCHEMES`] property.
    ///
    /// Returns an empty list when the property is absent. Schemes with names this crate does
    /// not recognize are returned as [`AuthScheme::Unknown`] rather than rejected.
    pub fn auth_schemes(&self) -> Result<Vec<AuthScheme>, EvaluationError> {
        match self.properties.get(AUTH_SCHEMES) {
            None => Ok(Vec::new()),
            Some(schemes) => schemes
                .expect_array()?
                .iter()
                .map(AuthScheme::from_value)
                .collect(),
        }
    }
}

/// Builder for [`Endpoint`]
#[derive(Debug, Default, Clone)]
pub struct Builder {
    url: Option<String>,
    headers: HashMap<String, Vec<String>>,
    properties: HashMap<String, Value>,
}

impl Builder {
    /// Sets the URL. Required.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Appends a value for `name`.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Sets a property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Constructs the endpoint.
    ///
    /// # Panics
    /// If the URL was never set.
    pub fn build(self) -> Endpoint {
        Endpoint {
            url: self.url.expect("url is required"),
            headers: self.headers,
            properties: self.properties,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Endpoint, AUTH_SCHEMES};
    use crate::auth::AuthScheme;
    use crate::value::Value;

    #[test]
    fn headers_accumulate() {
        let endpoint = Endpoint::builder()
            .url("https://example.com")
            .header("x-amz-a", "1")
            .header("x-amz-a", "2")
            .header("x-amz-b", "3")
            .build();
        assert_eq!(
            endpoint.header("x-amz-a"),
            Some(&["1".to_string(), "2".to_string()][..])
        );
        assert_eq!(endpoint.headers().count(), 2);
        assert_eq!(endpoint.header("x-amz-c"), None);
    }

    #[test]
    fn no_auth_schemes_property() {
        let endpoint = Endpoint::builder().url("https://example.com").build();
        assert!(endpoint.auth_schemes().unwrap().is_empty());
    }

    #[test]
    fn auth_schemes_must_be_a_list() {
        let endpoint = Endpoint::builder()
            .url("https://example.com")
            .property(AUTH_SCHEMES, "sigv4")
            .build();
        assert!(endpoint.auth_schemes().is_err());
    }

    #[test]
    fn auth_schemes_are_parsed_in_order() {
        let endpoint = Endpoint::builder()
            .url("https://example.com")
            .property(
                AUTH_SCHEMES,
                vec![
                    Value::record([
                        ("name", Value::from("sigv4a")),
                        ("signingName", Value::from("s3")),
                        ("signingRegionSet", Value::from(vec!["*".to_string()])),
                    ]),
                    Value::record([
                        ("name", Value::from("sigv4")),
                        ("signingName", Value::from("s3")),
                        ("signingRegion", Value::from("us-east-1")),
                    ]),
                ],
            )
            .build();
        let schemes = endpoint.auth_schemes().unwrap();
        assert_eq!(schemes.len(), 2);
        assert_eq!(schemes[0].name(), "sigv4a");
        assert!(matches!(&schemes[1], AuthScheme::SigV4 { signing_region: Some(r), .. } if r == "us-east-1"));
    }
}
