/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Handles to in-flight and received responses.

use crate::transport::{HttpResponse, ResponseFuture, TransportError};
use awsgen_json::JsonDecodeError;
use awsgen_types::Document;
use awsgen_xml::decode::XmlDecodeError;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::fmt;

/// Wire format of a response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// JSON payloads
    Json,
    /// XML payloads
    Xml,
}

/// The payload could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum PayloadDecodeError {
    /// Invalid JSON
    #[error(transparent)]
    Json(#[from] JsonDecodeError),
    /// Invalid XML
    #[error(transparent)]
    Xml(#[from] XmlDecodeError),
}

/// A dispatched request whose response has not been received yet.
pub struct ResponseHandle {
    future: ResponseFuture,
}

impl fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandle").finish_non_exhaustive()
    }
}

impl ResponseHandle {
    /// Wraps the future returned by a transport.
    pub fn new(future: ResponseFuture) -> Self {
        ResponseHandle { future }
    }

    /// Waits for the full response.
    pub async fn load(self) -> Result<LoadedResponse, TransportError> {
        let response = self.future.await?;
        tracing::trace!(status = %response.status(), "response received");
        Ok(LoadedResponse::from(response))
    }
}

/// A fully received response.
#[derive(Debug, Clone)]
pub struct LoadedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl From<HttpResponse> for LoadedResponse {
    fn from(response: HttpResponse) -> Self {
        let (parts, body) = response.into_parts();
        LoadedResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

impl LoadedResponse {
    /// HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the value of header `name` if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response, returning the raw body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Decodes the body. An empty body decodes to an empty object; XML payloads decode to the
    /// contents of their root element.
    pub fn decode(&self, format: PayloadFormat) -> Result<Document, PayloadDecodeError> {
        match format {
            PayloadFormat::Json => Ok(awsgen_json::decode(&self.body)?),
            PayloadFormat::Xml => Ok(awsgen_xml::decode::decode(&self.body)?
                .map(|root| root.value)
                .unwrap_or_else(|| Document::Object(Default::default()))),
        }
    }
}
