/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Partition resolution for the `aws.partition` function.
//!
//! A partition is a group of regions sharing DNS suffixes and feature support (`aws`,
//! `aws-cn`, `aws-us-gov`, ...). Regions are resolved in three steps:
//! 1. a region listed explicitly by a partition, with any per-region overrides applied
//! 2. the first partition whose `regionRegex` matches the region
//! 3. the `aws` partition

use crate::endpoint_lib::diagnostic::DiagnosticCollector;
use crate::error::RulesetError;
use crate::value::Value;
use regex_lite::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const DEFAULT_PARTITION: &str = "aws";

static DEFAULT_PARTITIONS: LazyLock<PartitionResolver> = LazyLock::new(|| {
    PartitionResolver::from_json(include_str!("partitions.json"))
        .expect("the embedded partitions.json is valid")
});

/// Returns the process-wide partition table.
///
/// The table is parsed from the embedded `partitions.json` on first use and is immutable
/// afterwards.
pub fn load_partitions() -> &'static PartitionResolver {
    &DEFAULT_PARTITIONS
}

/// Attributes of a resolved partition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionOutput {
    name: String,
    dns_suffix: String,
    dual_stack_dns_suffix: String,
    #[serde(rename = "supportsFIPS")]
    supports_fips: bool,
    supports_dual_stack: bool,
    #[serde(default)]
    implicit_global_region: String,
}

impl PartitionOutput {
    /// Partition id, e.g. `aws-cn`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DNS suffix of regular endpoints
    pub fn dns_suffix(&self) -> &str {
        &self.dns_suffix
    }

    /// DNS suffix of dual-stack endpoints
    pub fn dual_stack_dns_suffix(&self) -> &str {
        &self.dual_stack_dns_suffix
    }

    /// Whether the partition has FIPS endpoints
    pub fn supports_fips(&self) -> bool {
        self.supports_fips
    }

    /// Whether the partition has dual-stack endpoints
    pub fn supports_dual_stack(&self) -> bool {
        self.supports_dual_stack
    }

    /// Region used for global services
    pub fn implicit_global_region(&self) -> &str {
        &self.implicit_global_region
    }

    fn apply(&mut self, overrides: &PartitionOutputOverride) {
        if let Some(name) = &overrides.name {
            self.name = name.clone();
        }
        if let Some(dns_suffix) = &overrides.dns_suffix {
            self.dns_suffix = dns_suffix.clone();
        }
        if let Some(dual_stack_dns_suffix) = &overrides.dual_stack_dns_suffix {
            self.dual_stack_dns_suffix = dual_stack_dns_suffix.clone();
        }
        if let Some(supports_fips) = overrides.supports_fips {
            self.supports_fips = supports_fips;
        }
        if let Some(supports_dual_stack) = overrides.supports_dual_stack {
            self.supports_dual_stack = supports_dual_stack;
        }
        if let Some(implicit_global_region) = &overrides.implicit_global_region {
            self.implicit_global_region = implicit_global_region.clone();
        }
    }
}

impl From<PartitionOutput> for Value {
    fn from(output: PartitionOutput) -> Self {
        Value::record([
            ("name", Value::String(output.name)),
            ("dnsSuffix", Value::String(output.dns_suffix)),
            (
                "dualStackDnsSuffix",
                Value::String(output.dual_stack_dns_suffix),
            ),
            ("supportsFIPS", Value::Bool(output.supports_fips)),
            ("supportsDualStack", Value::Bool(output.supports_dual_stack)),
            (
                "implicitGlobalRegion",
                Value::String(output.implicit_global_region),
            ),
        ])
    }
}

// Region entries may override any output. Other keys (such as `description`) are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionOutputOverride {
    name: Option<String>,
    dns_suffix: Option<String>,
    dual_stack_dns_suffix: Option<String>,
    #[serde(rename = "supportsFIPS")]
    supports_fips: Option<bool>,
    supports_dual_stack: Option<bool>,
    implicit_global_region: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionsDocument {
    partitions: Vec<PartitionDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionDocument {
    id: String,
    region_regex: String,
    #[serde(default)]
    regions: HashMap<String, PartitionOutputOverride>,
    outputs: PartitionOutput,
}

#[derive(Debug)]
struct PartitionMetadata {
    id: String,
    region_regex: Regex,
    regions: HashMap<String, PartitionOutputOverride>,
    outputs: PartitionOutput,
}

impl PartitionMetadata {
    fn explicitly_matches(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    fn implicitly_matches(&self, region: &str) -> bool {
        self.region_regex.is_match(region)
    }

    fn resolve(&self, region: &str) -> PartitionOutput {
        let mut output = self.outputs.clone();
        if let Some(overrides) = self.regions.get(region) {
            output.apply(overrides);
        }
        output
    }
}

/// Resolves regions to partitions.
#[derive(Debug)]
pub struct PartitionResolver {
    partitions: Vec<PartitionMetadata>,
}

impl PartitionResolver {
    /// Parses a partitions document (`{"partitions": [{"id", "regionRegex", "regions",
    /// "outputs"}]}`).
    pub fn from_json(document: &str) -> Result<Self, RulesetError> {
        let document: PartitionsDocument = serde_json::from_str(document)?;
        let partitions = document
            .partitions
            .into_iter()
            .map(|partition| {
                let region_regex = Regex::new(&partition.region_regex).map_err(|err| {
                    RulesetError::Invalid(format!(
                        "partition `{}` has an invalid regionRegex: {err}",
                        partition.id
                    ))
                })?;
                Ok(PartitionMetadata {
                    id: partition.id,
                    region_regex,
                    regions: partition.regions,
                    outputs: partition.outputs,
                })
            })
            .collect::<Result<Vec<_>, RulesetError>>()?;
        Ok(Self { partitions })
    }

    /// Resolves `region` to a partition.
    ///
    /// Returns `None` only when the region is unknown and the table has no `aws` partition to
    /// fall back on.
    pub fn resolve(&self, region: &str) -> Option<PartitionOutput> {
        self.resolve_partition(region, &mut DiagnosticCollector::new())
    }

    pub(crate) fn resolve_partition(
        &self,
        region: &str,
        e: &mut DiagnosticCollector,
    ) -> Option<PartitionOutput> {
        let explicit = self.partitions.iter().find(|p| p.explicitly_matches(region));
        if let Some(partition) = explicit {
            return Some(partition.resolve(region));
        }
        let implicit = self.partitions.iter().find(|p| p.implicitly_matches(region));
        if let Some(partition) = implicit {
            return Some(partition.resolve(region));
        }
        match self.partitions.iter().find(|p| p.id == DEFAULT_PARTITION) {
            Some(partition) => {
                tracing::trace!(region, "region matched no partition, using `aws`");
                Some(partition.resolve(region))
            }
            None => {
                e.report_error(format!(
                    "no partition matched `{region}` and there is no `{DEFAULT_PARTITION}` partition"
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{load_partitions, PartitionResolver};
    use crate::endpoint_lib::diagnostic::DiagnosticCollector;
    use crate::value::Value;

    const CUSTOM: &str = r#"{
        "version": "1.1",
        "partitions": [
            {
                "id": "aws",
                "regionRegex": "^(us|eu)\\-\\w+\\-\\d+$",
                "regions": {
                    "us-east-1": {},
                    "aws-global": { "description": "global" },
                    "us-west-2": { "dnsSuffix": "override.example.com" }
                },
                "outputs": {
                    "name": "aws",
                    "dnsSuffix": "amazonaws.com",
                    "dualStackDnsSuffix": "api.aws",
                    "supportsFIPS": true,
                    "supportsDualStack": true,
                    "implicitGlobalRegion": "us-east-1"
                }
            },
            {
                "id": "other",
                "regionRegex": "^other\\-\\w+\\-\\d+$",
                "regions": { "us-west-1": {} },
                "outputs": {
                    "name": "other",
                    "dnsSuffix": "other.example.com",
                    "dualStackDnsSuffix": "dualstack.other.example.com",
                    "supportsFIPS": false,
                    "supportsDualStack": false
                }
            }
        ]
    }"#;

    #[test]
    fn embedded_table_loads() {
        let partitions = load_partitions();
        let aws = partitions.resolve("us-east-1").unwrap();
        assert_eq!(aws.name(), "aws");
        assert_eq!(aws.dns_suffix(), "amazonaws.com");
        assert_eq!(aws.dual_stack_dns_suffix(), "api.aws");
        assert!(aws.supports_fips());
        assert!(aws.supports_dual_stack());
        assert_eq!(aws.implicit_global_region(), "us-east-1");
        assert!(std::ptr::eq(partitions, load_partitions()));
    }

    #[test]
    fn well_known_partitions() {
        let partitions = load_partitions();
        let name = |region: &str| partitions.resolve(region).unwrap().name().to_string();
        assert_eq!(name("cn-north-1"), "aws-cn");
        assert_eq!(name("us-gov-west-1"), "aws-us-gov");
        assert_eq!(name("us-gov-east-2"), "aws-us-gov");
        assert_eq!(name("us-iso-east-1"), "aws-iso");
        assert_eq!(name("us-isob-east-1"), "aws-iso-b");
        assert_eq!(name("eu-isoe-west-1"), "aws-iso-e");
        assert_eq!(name("us-isof-south-1"), "aws-iso-f");
        assert_eq!(name("eusc-de-east-1"), "aws-eusc");
        assert_eq!(name("aws-global"), "aws");
        // matches the `aws` regex without being listed
        assert_eq!(name("ap-southeast-9"), "aws");
    }

    #[test]
    fn unknown_regions_fall_back_to_aws() {
        let partitions = load_partitions();
        assert_eq!(partitions.resolve("mars-east-1").unwrap().name(), "aws");
        assert_eq!(partitions.resolve("").unwrap().name(), "aws");
    }

    #[test]
    fn iso_partitions_do_not_support_dual_stack() {
        let iso = load_partitions().resolve("us-iso-east-1").unwrap();
        assert!(iso.supports_fips());
        assert!(!iso.supports_dual_stack());
    }

    #[test]
    fn explicit_regions_win_over_regexes() {
        let partitions = PartitionResolver::from_json(CUSTOM).unwrap();
        // `us-west-1` matches the `aws` regex but is listed by `other`
        assert_eq!(partitions.resolve("us-west-1").unwrap().name(), "other");
        assert_eq!(partitions.resolve("other-east-1").unwrap().name(), "other");
        assert_eq!(partitions.resolve("eu-west-1").unwrap().name(), "aws");
    }

    #[test]
    fn region_overrides_apply() {
        let partitions = PartitionResolver::from_json(CUSTOM).unwrap();
        let overridden = partitions.resolve("us-west-2").unwrap();
        assert_eq!(overridden.dns_suffix(), "override.example.com");
        assert_eq!(overridden.dual_stack_dns_suffix(), "api.aws");
        assert_eq!(
            partitions.resolve("us-east-1").unwrap().dns_suffix(),
            "amazonaws.com"
        );
    }

    #[test]
    fn missing_fallback_does_not_apply() {
        let partitions = PartitionResolver::from_json(
            r#"{"partitions": [{
                "id": "only",
                "regionRegex": "^only$",
                "outputs": {
                    "name": "only",
                    "dnsSuffix": "example.com",
                    "dualStackDnsSuffix": "example.com",
                    "supportsFIPS": false,
                    "supportsDualStack": false
                }
            }]}"#,
        )
        .unwrap();
        let mut e = DiagnosticCollector::new();
        assert!(partitions.resolve_partition("us-east-1", &mut e).is_none());
        assert!(e.take_last_error().is_some());
        assert!(partitions.resolve("only").is_some());
    }

    #[test]
    fn invalid_documents() {
        assert!(PartitionResolver::from_json("{}").is_err());
        assert!(PartitionResolver::from_json(
            r#"{"partitions": [{
                "id": "bad",
                "regionRegex": "(",
                "outputs": {
                    "name": "bad",
                    "dnsSuffix": "example.com",
                    "dualStackDnsSuffix": "example.com",
                    "supportsFIPS": false,
                    "supportsDualStack": false
                }
            }]}"#,
        )
        .is_err());
    }

    #[test]
    fn outputs_convert_to_records() {
        let value = Value::from(load_partitions().resolve("cn-north-1").unwrap());
        let fields = value.expect_record().unwrap();
        assert_eq!(fields["name"], Value::from("aws-cn"));
        assert_eq!(fields["dnsSuffix"], Value::from("amazonaws.com.cn"));
        assert_eq!(fields["supportsFIPS"], Value::Bool(true));
        assert_eq!(fields["implicitGlobalRegion"], Value::from("cn-northwest-1"));
    }
}
