/*
 *  Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 *  SPDX-License-Identifier: Apache-2.0
 */

//! Implementations of the rules-engine standard library and AWS extension functions.

pub(crate) mod arn;
pub(crate) mod diagnostic;
pub(crate) mod host;
pub(crate) mod parse_url;
pub(crate) mod partition;
pub(crate) mod s3;
pub(crate) mod split;
pub(crate) mod substring;
pub(crate) mod uri_encode;
