/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The boundary between generated clients and the HTTP stack that sends their requests.

use crate::content::ContentSource;
use bytes::Bytes;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type BoxError = Box<dyn Error + Send + Sync>;

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// An in-memory body
    Bytes(Bytes),
    /// A body streamed from a seekable resource
    Stream(ContentSource),
}

impl RequestBody {
    /// Returns the in-memory content of the body, if it is not streamed.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Empty => Some(&[]),
            RequestBody::Bytes(bytes) => Some(bytes),
            RequestBody::Stream(_) => None,
        }
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        if value.is_empty() {
            RequestBody::Empty
        } else {
            RequestBody::Bytes(Bytes::from(value))
        }
    }
}

/// An outgoing request.
pub type HttpRequest = http::Request<RequestBody>;

/// A fully received response.
pub type HttpResponse = http::Response<Bytes>;

/// Future returned by [`Transport::send`].
pub type ResponseFuture =
    Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'static>>;

/// Sends requests over the network (or pretends to).
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request`. Implementations must not block; the work happens when the returned
    /// future is polled.
    fn send(&self, request: HttpRequest) -> ResponseFuture;
}

/// A cheaply cloneable [`Transport`].
#[derive(Clone, Debug)]
pub struct SharedTransport(Arc<dyn Transport>);

impl SharedTransport {
    /// Wraps `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        SharedTransport(Arc::new(transport))
    }
}

impl Transport for SharedTransport {
    fn send(&self, request: HttpRequest) -> ResponseFuture {
        self.0.send(request)
    }
}

/// The request could not be sent, or no response was received.
#[derive(Debug)]
pub struct TransportError {
    message: String,
    source: Option<BoxError>,
}

impl TransportError {
    /// Creates an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error caused by `source`.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TransportError {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}
