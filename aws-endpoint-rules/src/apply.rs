/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Applying a resolved [`Endpoint`] to an HTTP request.

use crate::endpoint::Endpoint;
use crate::resolver::ResolveEndpointError;
use http::header::{HeaderName, HeaderValue};
use http::uri::{Authority, Parts, PathAndQuery, Scheme, Uri};
use std::error::Error;
use std::str::FromStr;

/// A prefix prepended to the endpoint host, such as `subregion.`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointPrefix(String);

impl EndpointPrefix {
    /// Creates a prefix, checking that it forms a valid authority.
    pub fn new(prefix: impl Into<String>) -> Result<Self, ResolveEndpointError> {
        let prefix = prefix.into();
        Authority::from_str(&prefix)
            .map_err(|err| invalid(format!("endpoint prefix `{prefix}`"), err))?;
        Ok(EndpointPrefix(prefix))
    }

    /// The prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn prepend_to(&self, authority: &Authority) -> Result<Authority, ResolveEndpointError> {
        let prefixed = format!("{}{authority}", self.0);
        Authority::from_str(&prefixed)
            .map_err(|err| invalid(format!("authority `{prefixed}`"), err))
    }
}

/// Where requests for one endpoint are sent.
struct Target {
    scheme: Scheme,
    authority: Authority,
    /// Endpoint path without its trailing `/`
    base_path: String,
}

impl Target {
    fn new(
        endpoint: &Endpoint,
        prefix: Option<&EndpointPrefix>,
    ) -> Result<Self, ResolveEndpointError> {
        let url = endpoint.url();
        let uri = Uri::from_str(url).map_err(|err| invalid(format!("endpoint `{url}`"), err))?;
        if let Some(query) = uri.query() {
            tracing::warn!(%query, "query specified in endpoint will be ignored during endpoint resolution");
        }
        let base_path = uri.path().trim_end_matches('/').to_owned();
        let Parts {
            scheme,
            authority,
            ..
        } = uri.into_parts();
        let (Some(scheme), Some(authority)) = (scheme, authority) else {
            return Err(ResolveEndpointError::message(format!(
                "endpoint `{url}` must have a scheme and an authority"
            )));
        };
        let authority = match prefix {
            Some(prefix) => prefix.prepend_to(&authority)?,
            None => authority,
        };
        Ok(Target {
            scheme,
            authority,
            base_path,
        })
    }

    /// Joins the endpoint path in front of the request's path, keeping the request's query.
    fn path_and_query(&self, request: &Uri) -> Result<PathAndQuery, ResolveEndpointError> {
        let request_path = request
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or_default();
        let relative = request_path.strip_prefix('/').unwrap_or(request_path);
        let joined = format!("{}/{relative}", self.base_path);
        PathAndQuery::from_str(&joined)
            .map_err(|err| invalid(format!("request path `{joined}`"), err))
    }

    fn uri_for(&self, request: &Uri) -> Result<Uri, ResolveEndpointError> {
        let mut parts = Parts::default();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        parts.path_and_query = Some(self.path_and_query(request)?);
        Uri::from_parts(parts).map_err(|err| invalid(format!("request URI for `{request}`"), err))
    }
}

/// Points `request` at `endpoint`.
///
/// The request's scheme and authority are replaced with the endpoint's, the endpoint path is
/// joined in front of the request path (the request query is kept) and every header the
/// endpoint sets replaces the request's values for that header.
///
/// Headers are validated before any are written, so a failure leaves them untouched.
pub fn apply_endpoint<B>(
    request: &mut http::Request<B>,
    endpoint: &Endpoint,
    prefix: Option<&EndpointPrefix>,
) -> Result<(), ResolveEndpointError> {
    tracing::debug!(endpoint = %endpoint.url(), "applying endpoint");
    let uri = Target::new(endpoint, prefix)?.uri_for(request.uri())?;
    let headers = endpoint
        .headers()
        .map(|(name, values)| -> Result<_, ResolveEndpointError> {
            let name = HeaderName::from_str(name)
                .map_err(|err| invalid(format!("header name `{name}`"), err))?;
            let values = values
                .map(|value| {
                    HeaderValue::from_str(value)
                        .map_err(|err| invalid(format!("value for header `{name}`"), err))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((name, values))
        })
        .collect::<Result<Vec<_>, ResolveEndpointError>>()?;

    *request.uri_mut() = uri;
    let request_headers = request.headers_mut();
    for (name, values) in headers {
        request_headers.remove(&name);
        for value in values {
            request_headers.append(&name, value);
        }
    }
    Ok(())
}

fn invalid(what: String, err: impl Error + Send + Sync + 'static) -> ResolveEndpointError {
    ResolveEndpointError::from_source(format!("invalid {what}"), err)
}
