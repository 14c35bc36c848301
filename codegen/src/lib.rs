/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Compiles AWS service models into client bindings.
//!
//! A [`CodegenRun`] walks the operations of a [`ServiceModel`]. Each operation compiles into a
//! [`ClientMethod`]: input validation, a request serializer for the service's protocol and a
//! response deserializer. Shapes shared between operations are compiled once per run, and every
//! compiled shape, enum and method is rendered to Rust source and handed to an
//! [`EmissionSink`].
//!
//! ```no_run
//! use awsgen_codegen::{ClientConfig, CodegenRun, MemorySink, ServiceModel};
//! use awsgen_http::transport::SharedTransport;
//!
//! # fn run(transport: SharedTransport) -> Result<(), Box<dyn std::error::Error>> {
//! let model = ServiceModel::from_json(&std::fs::read_to_string("sqs.json")?)?;
//! let mut sink = MemorySink::new();
//! let report = CodegenRun::new(&model, &mut sink).run();
//! let client = report.into_client(ClientConfig::new("https://sqs.us-east-1.amazonaws.com", transport));
//! let _output = client.invoke("ListQueues", awsgen_codegen::StructValue::new("ListQueuesRequest"))?;
//! # Ok(())
//! # }
//! ```

#![warn(
    rustdoc::missing_crate_level_docs,
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod cache;
pub mod client;
mod coerce;
pub mod de;
pub mod emit;
pub mod enum_gen;
pub mod error;
pub mod model;
pub mod naming;
pub mod operation;
pub mod paginator;
pub mod plan;
mod render;
pub mod run;
pub mod ser;
pub mod settings;
pub mod validate;
pub mod value;

pub use client::{Client, ClientConfig};
pub use emit::{EmissionSink, FileSink, MemorySink};
pub use error::{
    CompileError, DeserializeError, EmitError, InvocationError, ModelError, PageError,
    SerializeError, ValidationError,
};
pub use model::ServiceModel;
pub use operation::{ClientMethod, OperationOutput};
pub use paginator::PaginationStream;
pub use run::{CodegenRun, GenerationReport};
pub use settings::{CodegenSettings, EnumCollisionPolicy};
pub use value::{ShapeInput, StructValue, Value};
