/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! HTTP plumbing shared by awsgen generated clients: the transport boundary, response
//! handling, seekable request content, lazily populated results and URI encoding helpers.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod content;
pub mod label;
pub mod lazy;
pub mod query;
pub mod response;
pub mod result;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;
