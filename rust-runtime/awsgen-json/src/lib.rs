/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! JSON serialization and payload decoding for the awsJson and restJson protocols.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod deserialize;
mod escape;
pub mod serialize;

pub use deserialize::{decode, JsonDecodeError};
