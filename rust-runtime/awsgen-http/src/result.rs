/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Errors surfaced when an operation's result is resolved.

use crate::transport::TransportError;
use bytes::Bytes;
use http::StatusCode;
use std::error::Error;
use std::fmt;

/// Failed to obtain the result of an operation.
#[derive(Debug)]
pub enum SdkError<E> {
    /// The request failed during dispatch. An HTTP response was not received. The request MAY
    /// have been sent.
    DispatchFailure(TransportError),

    /// A response was received but it could not be parsed according to the protocol.
    ResponseError {
        /// HTTP status of the response
        status: StatusCode,
        /// Parse failure
        err: E,
    },

    /// An error response was received from the service.
    ServiceError {
        /// HTTP status of the response
        status: StatusCode,
        /// Raw body of the response
        body: Bytes,
    },
}

impl<E> SdkError<E> {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::DispatchFailure(_) => None,
            SdkError::ResponseError { status, .. } | SdkError::ServiceError { status, .. } => {
                Some(*status)
            }
        }
    }
}

impl<E> fmt::Display for SdkError<E>
where
    E: Error,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::DispatchFailure(err) => write!(f, "dispatch failure: {}", err),
            SdkError::ResponseError { status, err } => {
                write!(f, "failed to parse response ({}): {}", status, err)
            }
            SdkError::ServiceError { status, body } => write!(
                f,
                "service error ({}): {}",
                status,
                String::from_utf8_lossy(body)
            ),
        }
    }
}

impl<E> Error for SdkError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SdkError::DispatchFailure(err) => Some(err),
            SdkError::ResponseError { err, .. } => Some(err),
            SdkError::ServiceError { .. } => None,
        }
    }
}
