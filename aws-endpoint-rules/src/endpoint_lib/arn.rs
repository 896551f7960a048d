/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::DiagnosticCollector;
use crate::value::Value;

/// A parsed ARN: `arn:<partition>:<service>:<region>:<account-id>:<resource>`.
///
/// `region` and `account_id` may be empty. The resource is split on both `:` and `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Arn<'a> {
    partition: &'a str,
    service: &'a str,
    region: &'a str,
    account_id: &'a str,
    resource_id: Vec<&'a str>,
}

impl<'a> Arn<'a> {
    pub(crate) fn partition(&self) -> &'a str {
        self.partition
    }

    pub(crate) fn service(&self) -> &'a str {
        self.service
    }

    pub(crate) fn region(&self) -> &'a str {
        self.region
    }

    pub(crate) fn account_id(&self) -> &'a str {
        self.account_id
    }

    pub(crate) fn resource_id(&self) -> &[&'a str] {
        &self.resource_id
    }

    fn parse(arn: &'a str) -> Result<Self, &'static str> {
        let mut split = arn.splitn(6, ':');
        let invalid_format = "ARNs must be of the form arn:<partition>:<service>:<region>:<account>:<resource>";
        if split.next() != Some("arn") {
            return Err("ARNs must start with `arn`");
        }
        let partition = split.next().ok_or(invalid_format)?;
        let service = split.next().ok_or(invalid_format)?;
        let region = split.next().ok_or(invalid_format)?;
        let account_id = split.next().ok_or(invalid_format)?;
        let resource = split.next().ok_or(invalid_format)?;
        if partition.is_empty() {
            return Err("partition must not be empty");
        }
        if service.is_empty() {
            return Err("service must not be empty");
        }
        if resource.is_empty() {
            return Err("resource must not be empty");
        }
        Ok(Self {
            partition,
            service,
            region,
            account_id,
            resource_id: resource.split([':', '/']).collect(),
        })
    }
}

impl From<Arn<'_>> for Value {
    fn from(arn: Arn<'_>) -> Self {
        Value::record([
            ("partition", Value::from(arn.partition)),
            ("service", Value::from(arn.service)),
            ("region", Value::from(arn.region)),
            ("accountId", Value::from(arn.account_id)),
            (
                "resourceId",
                Value::Array(arn.resource_id.into_iter().map(Value::from).collect()),
            ),
        ])
    }
}

pub(crate) fn parse_arn<'a>(input: &'a str, e: &mut DiagnosticCollector) -> Option<Arn<'a>> {
    e.capture(Arn::parse(input))
}

#[cfg(test)]
mod test {
    use super::parse_arn;
    use crate::endpoint_lib::diagnostic::DiagnosticCollector;
    use crate::value::Value;

    #[test]
    fn arn_parser() {
        let arn = "arn:aws:s3:us-east-2:012345678:outpost:op-1234";
        let parsed = parse_arn(arn, &mut DiagnosticCollector::new()).expect("valid ARN");
        assert_eq!(parsed.partition(), "aws");
        assert_eq!(parsed.service(), "s3");
        assert_eq!(parsed.region(), "us-east-2");
        assert_eq!(parsed.account_id(), "012345678");
        assert_eq!(parsed.resource_id(), &["outpost", "op-1234"]);
    }

    #[test]
    fn resource_ids_split_on_slashes() {
        let arn = "arn:aws:s3-outposts:us-west-2:123456789012:outpost/op-01/bucket/mybucket";
        let parsed = parse_arn(arn, &mut DiagnosticCollector::new()).expect("valid ARN");
        assert_eq!(
            parsed.resource_id(),
            &["outpost", "op-01", "bucket", "mybucket"]
        );
    }

    #[test]
    fn region_and_account_may_be_empty() {
        let parsed = parse_arn("arn:aws:s3:::mybucket", &mut DiagnosticCollector::new())
            .expect("valid ARN");
        assert_eq!(parsed.region(), "");
        assert_eq!(parsed.account_id(), "");
        assert_eq!(parsed.resource_id(), &["mybucket"]);
    }

    #[test]
    fn invalid_arns() {
        for arn in [
            "",
            "arn",
            "arn:aws:s3:us-east-1:123",
            "not-arn:aws:s3:us-east-1:123:bucket",
            "arn::s3:us-east-1:123:bucket",
            "arn:aws::us-east-1:123:bucket",
            "arn:aws:s3:us-east-1:123:",
        ] {
            let mut e = DiagnosticCollector::new();
            assert_eq!(parse_arn(arn, &mut e), None, "{arn} should be rejected");
            assert!(e.take_last_error().is_some());
        }
    }

    #[test]
    fn converts_to_a_record() {
        let parsed = parse_arn("arn:aws:iam::123456789012:user/ted", &mut DiagnosticCollector::new())
            .expect("valid ARN");
        let value = Value::from(parsed);
        let fields = value.expect_record().unwrap();
        assert_eq!(fields["accountId"], Value::from("123456789012"));
        assert_eq!(
            fields["resourceId"],
            Value::Array(vec![Value::from("user"), Value::from("ted")])
        );
    }
}
