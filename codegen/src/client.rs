/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A service client built from compiled operations.
//!
//! [`GenerationReport::into_client`](crate::GenerationReport::into_client) groups the methods of
//! a run under one [`ClientConfig`]. Operations are looked up by their model name.

use crate::error::InvocationError;
use crate::operation::{ClientMethod, OperationOutput};
use crate::paginator::PaginationStream;
use crate::value::ShapeInput;
use awsgen_http::transport::SharedTransport;
use indexmap::IndexMap;
use std::sync::Arc;

/// Where and how a [`Client`] sends its requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    endpoint: String,
    transport: SharedTransport,
}

impl ClientConfig {
    /// Sends requests for `endpoint` through `transport`.
    pub fn new(endpoint: impl Into<String>, transport: SharedTransport) -> Self {
        ClientConfig {
            endpoint: endpoint.into(),
            transport,
        }
    }

    /// Base URI that request paths are resolved against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Transport every request is sent through.
    pub fn transport(&self) -> &SharedTransport {
        &self.transport
    }
}

/// Client for one service.
///
/// Clients are cheap to clone; clones share their compiled methods and transport. Outputs
/// returned by [`invoke`](Client::invoke) are owned by the caller and share no state.
#[derive(Debug, Clone)]
pub struct Client {
    methods: Arc<IndexMap<String, Arc<ClientMethod>>>,
    config: ClientConfig,
}

impl Client {
    /// Creates a client over compiled `methods`, keyed by operation name.
    pub fn new(methods: IndexMap<String, Arc<ClientMethod>>, config: ClientConfig) -> Self {
        Client {
            methods: Arc::new(methods),
            config,
        }
    }

    /// Endpoint and transport of the client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The method of operation `name`.
    pub fn method(&self, name: &str) -> Option<&Arc<ClientMethod>> {
        self.methods.get(name)
    }

    /// Names of the client's operations.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    fn require(&self, name: &str) -> Result<&Arc<ClientMethod>, InvocationError> {
        self.method(name)
            .ok_or_else(|| InvocationError::UnknownOperation(name.to_string()))
    }

    /// Invokes operation `name`. See [`ClientMethod::invoke`].
    pub fn invoke(
        &self,
        name: &str,
        input: impl Into<ShapeInput>,
    ) -> Result<OperationOutput, InvocationError> {
        self.require(name)?
            .invoke(&self.config.transport, &self.config.endpoint, input)
    }

    /// Iterates over the pages of operation `name`.
    pub fn paginate(
        &self,
        name: &str,
        input: impl Into<ShapeInput>,
    ) -> Result<PaginationStream, InvocationError> {
        self.require(name)?
            .paginate(&self.config.transport, &self.config.endpoint, input)
    }
}
