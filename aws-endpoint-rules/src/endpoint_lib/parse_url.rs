/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;
use http::Uri;
use std::borrow::Cow;

/// Components of a URL accepted by `parseURL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Url<'a> {
    scheme: Cow<'a, str>,
    authority: &'a str,
    path: &'a str,
    is_ip: bool,
}

impl<'a> Url<'a> {
    /// Always lowercase
    pub(crate) fn scheme(&self) -> &str {
        &self.scheme
    }

    pub(crate) fn authority(&self) -> &'a str {
        self.authority
    }

    /// The path exactly as written, possibly empty
    pub(crate) fn path(&self) -> &'a str {
        self.path
    }

    /// The path with a leading and trailing `/`
    pub(crate) fn normalized_path(&self) -> Cow<'a, str> {
        if self.path.is_empty() {
            return Cow::Borrowed("/");
        }
        let leading = !self.path.starts_with('/');
        let trailing = !self.path.ends_with('/');
        if !leading && !trailing {
            return Cow::Borrowed(self.path);
        }
        let mut normalized = String::with_capacity(self.path.len() + 2);
        if leading {
            normalized.push('/');
        }
        normalized.push_str(self.path);
        if trailing {
            normalized.push('/');
        }
        Cow::Owned(normalized)
    }

    pub(crate) fn is_ip(&self) -> bool {
        self.is_ip
    }
}

/// Parses `url` into its components.
///
/// Returns `None` when the URL is malformed, when its scheme is not `http` or `https`, or when
/// it has a query string. Rejecting query strings is intentional: endpoints never carry one.
pub(crate) fn parse_url<'a>(url: &'a str, e: &mut DiagnosticCollector) -> Option<Url<'a>> {
    let uri: Uri = e.capture(url.parse::<Uri>())?;
    if let Some(query) = uri.query() {
        e.report_error(format!("URL cannot have a query component (found `{query}`)"));
        return None;
    }
    let (scheme, rest) = match url.split_once("://") {
        Some(parts) => parts,
        None => {
            e.report_error("URL must have a scheme and an authority");
            return None;
        }
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        e.report_error(format!("URL scheme must be HTTP or HTTPS (found `{scheme}`)"));
        return None;
    }
    let host = match uri.host() {
        Some(host) if !host.is_empty() => host,
        _ => {
            e.report_error("URL must have a host");
            return None;
        }
    };
    let rest = rest.split('#').next().unwrap_or_default();
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let scheme = if scheme.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(scheme.to_ascii_lowercase())
    } else {
        Cow::Borrowed(scheme)
    };
    Some(Url {
        scheme,
        authority,
        path,
        is_ip: host.starts_with('[') || is_ipv4(host),
    })
}

/// Dotted-quad check: four decimal octets, each in `0..=255`.
pub(crate) fn is_ipv4(host: &str) -> bool {
    let mut octets = 0;
    for octet in host.split('.') {
        octets += 1;
        if octets > 4
            || octet.is_empty()
            || octet.len() > 3
            || !octet.bytes().all(|b| b.is_ascii_digit())
        {
            return false;
        }
        match octet.parse::<u16>() {
            Ok(value) if value <= 255 => {}
            _ => return false,
        }
    }
    octets == 4
}

#[cfg(test)]
mod test {
    use super::{is_ipv4, parse_url};
    use crate::endpoint_lib::diagnostic::DiagnosticCollector;
    use proptest::prelude::*;

    #[test]
    fn parse_simple_url() {
        let url = "https://www.example.com";
        let parsed = parse_url(url, &mut DiagnosticCollector::new()).expect("valid url");
        assert_eq!(parsed.scheme(), "https");
        assert_eq!(parsed.authority(), "www.example.com");
        assert_eq!(parsed.path(), "");
        assert_eq!(parsed.normalized_path(), "/");
        assert!(!parsed.is_ip());
    }

    #[test]
    fn parse_url_with_port_and_path() {
        let url = "http://example.com:8080/foo/bar";
        let parsed = parse_url(url, &mut DiagnosticCollector::new()).expect("valid url");
        assert_eq!(parsed.scheme(), "http");
        assert_eq!(parsed.authority(), "example.com:8080");
        assert_eq!(parsed.path(), "/foo/bar");
        assert_eq!(parsed.normalized_path(), "/foo/bar/");
    }

    #[test]
    fn schemes_are_lowercased() {
        let parsed = parse_url("HTTPS://example.com/a", &mut DiagnosticCollector::new())
            .expect("valid url");
        assert_eq!(parsed.scheme(), "https");
        assert_eq!(parsed.authority(), "example.com");
        assert_eq!(parsed.path(), "/a");
        let parsed =
            parse_url("Http://example.com", &mut DiagnosticCollector::new()).expect("valid url");
        assert_eq!(parsed.scheme(), "http");
    }

    #[test]
    fn trailing_slash_is_preserved() {
        let parsed =
            parse_url("https://example.com/", &mut DiagnosticCollector::new()).expect("valid url");
        assert_eq!(parsed.path(), "/");
        assert_eq!(parsed.normalized_path(), "/");
    }

    #[test]
    fn ip_hosts() {
        for url in [
            "https://127.0.0.1",
            "https://127.0.0.1:8443/path",
            "https://[fe80::1]",
            "http://[::1]:8080/",
        ] {
            let parsed = parse_url(url, &mut DiagnosticCollector::new()).expect("valid url");
            assert!(parsed.is_ip(), "{url} should be an IP");
        }
        for url in ["https://999.0.0.1", "https://1.2.3", "https://1.2.3.4.example.com"] {
            let parsed = parse_url(url, &mut DiagnosticCollector::new()).expect("valid url");
            assert!(!parsed.is_ip(), "{url} should not be an IP");
        }
    }

    #[test]
    fn query_strings_are_rejected() {
        let mut e = DiagnosticCollector::new();
        assert_eq!(parse_url("https://example.com/?foo=bar", &mut e), None);
        assert!(e
            .take_last_error()
            .expect("error recorded")
            .to_string()
            .contains("query"));
    }

    #[test]
    fn invalid_urls() {
        for url in ["not a url", "ftp://example.com", "example.com", "https://", ""] {
            assert_eq!(
                parse_url(url, &mut DiagnosticCollector::new()),
                None,
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn ipv4_octets() {
        assert!(is_ipv4("0.0.0.0"));
        assert!(is_ipv4("255.255.255.255"));
        assert!(!is_ipv4("256.0.0.1"));
        assert!(!is_ipv4("1.2.3.4.5"));
        assert!(!is_ipv4("1..3.4"));
        assert!(!is_ipv4("a.b.c.d"));
    }

    proptest! {
        #[test]
        fn path_round_trips(path in "(/[a-z0-9_-]{1,8}){0,4}/?") {
            let url = format!("https://example.com{path}");
            let parsed = parse_url(&url, &mut DiagnosticCollector::new()).expect("valid url");
            prop_assert_eq!(parsed.path(), path.as_str());
            let normalized = parsed.normalized_path();
            prop_assert!(normalized.starts_with('/'));
            prop_assert!(normalized.ends_with('/'));
        }
    }
}
