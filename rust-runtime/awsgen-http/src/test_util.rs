/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Transports useful for testing.

use crate::transport::{
    HttpRequest, HttpResponse, RequestBody, ResponseFuture, Transport, TransportError,
};
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use std::ops::Deref;
use std::sync::{Arc, Mutex};

/// A request captured by [`ReplayTransport`]. Streamed bodies are read in full.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl RecordedRequest {
    /// Body as UTF-8 text.
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }

    /// Value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.to_str().unwrap())
    }
}

/// Builds a canned response.
pub fn response(status: u16, body: impl Into<Bytes>) -> HttpResponse {
    http::Response::builder()
        .status(status)
        .body(body.into())
        .unwrap()
}

/// Replays a preloaded series of responses in order and records the requests it receives.
#[derive(Debug, Clone, Default)]
pub struct ReplayTransport {
    responses: Arc<Mutex<Vec<HttpResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ReplayTransport {
    /// Creates a transport answering with `responses`, first to last.
    pub fn new(mut responses: Vec<HttpResponse>) -> Self {
        responses.reverse();
        ReplayTransport {
            responses: Arc::new(Mutex::new(responses)),
            requests: Default::default(),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> impl Deref<Target = Vec<RecordedRequest>> + '_ {
        self.requests.lock().unwrap()
    }

    /// Asserts that every canned response was used.
    pub fn assert_exhausted(&self) {
        let remaining = self.responses.lock().unwrap().len();
        assert_eq!(
            remaining,
            0,
            "Expected {} additional requests ({} were made)",
            remaining,
            self.requests().len()
        );
    }
}

impl Transport for ReplayTransport {
    fn send(&self, request: HttpRequest) -> ResponseFuture {
        let (parts, body) = request.into_parts();
        let body = match body {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(bytes) => bytes,
            RequestBody::Stream(source) => source.read_all().unwrap(),
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        let next = self.responses.lock().unwrap().pop();
        Box::pin(async move { next.ok_or_else(|| TransportError::new("no more responses")) })
    }
}
