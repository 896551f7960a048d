/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_endpoint_rules::{
    load_partitions, DefaultResolver, EndpointRuleset, Params, PartitionResolver, ResolveEndpoint,
};
use std::sync::Arc;
use std::thread;

const REGIONS: &[(&str, &str, &str)] = &[
    ("us-east-1", "https://svc.us-east-1.amazonaws.com", "aws"),
    ("eu-west-1", "https://svc.eu-west-1.amazonaws.com", "aws"),
    (
        "cn-northwest-1",
        "https://svc.cn-northwest-1.amazonaws.com.cn",
        "aws-cn",
    ),
    (
        "us-gov-west-1",
        "https://svc.us-gov-west-1.amazonaws.com",
        "aws-us-gov",
    ),
    ("us-iso-east-1", "https://svc.us-iso-east-1.c2s.ic.gov", "aws-iso"),
];

#[test]
fn partitions_load_once_across_threads() {
    let main: *const PartitionResolver = load_partitions();
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| load_partitions() as *const PartitionResolver as usize))
        .collect();
    for handle in handles {
        let from_thread = handle.join().expect("thread panicked") as *const PartitionResolver;
        assert!(std::ptr::eq(main, from_thread));
    }
}

#[test]
fn one_rule_set_serves_many_threads() {
    let ruleset = Arc::new(
        EndpointRuleset::from_json(include_str!("../test-data/regional.json"))
            .expect("valid rule set"),
    );
    let handles: Vec<_> = REGIONS
        .iter()
        .map(|&(region, url, partition)| {
            let resolver = DefaultResolver::new(ruleset.clone());
            thread::spawn(move || {
                // several passes so evaluations on different threads interleave
                for _ in 0..50 {
                    let params = Params::builder().set("Region", region).build();
                    let endpoint = resolver
                        .resolve_endpoint(&params)
                        .unwrap_or_else(|err| panic!("{region} failed to resolve: {err}"));
                    assert_eq!(endpoint.url(), url, "wrong endpoint for {region}");
                    assert_eq!(
                        endpoint.header("x-amz-partition"),
                        Some(&[partition.to_string()][..])
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    assert_eq!(Arc::strong_count(&ruleset), 1);
}

#[test]
fn shared_resolver_across_scoped_threads() {
    let resolver = DefaultResolver::new(
        EndpointRuleset::from_json(include_str!("../test-data/regional.json"))
            .expect("valid rule set"),
    );
    thread::scope(|scope| {
        for &(region, url, _) in REGIONS {
            let resolver = &resolver;
            scope.spawn(move || {
                let params = Params::builder().set("Region", region).build();
                assert_eq!(resolver.resolve_endpoint(&params).unwrap().url(), url);
            });
        }
    });
}
