/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Protocol-agnostic types for awsgen.
//!
//! These are the leaves of every value graph the code generator produces: decoded response
//! payloads are [`Document`]s, and typed scalars (timestamps, blobs) use [`DateTime`] and [`Blob`].

#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod base64;
pub mod date_time;

mod blob;
mod document;
mod number;

pub use blob::Blob;
pub use date_time::DateTime;
pub use document::Document;
pub use number::Number;
