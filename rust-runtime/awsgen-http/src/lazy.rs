/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A result that is populated on first access.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Future that produces the value of a [`LazyResult`].
pub type PopulateFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

enum State<T, E> {
    Unpopulated(PopulateFuture<T, E>),
    Populated(T),
    Failed(E),
}

/// A value that is computed at most once, the first time it is resolved.
///
/// The population future is stored in place, so dropping a [`resolve`](LazyResult::resolve)
/// call before it completes leaves the result unpopulated; the next call continues the same
/// future. Once populated, the outcome (success or failure) never changes.
pub struct LazyResult<T, E> {
    state: State<T, E>,
}

impl<T, E> fmt::Debug for LazyResult<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LazyResult");
        match &self.state {
            State::Unpopulated(_) => debug.field("state", &"unpopulated"),
            State::Populated(value) => debug.field("value", value),
            State::Failed(err) => debug.field("error", err),
        };
        debug.finish()
    }
}

impl<T, E> LazyResult<T, E> {
    /// Creates a result populated by `future` on first resolve.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        LazyResult {
            state: State::Unpopulated(Box::pin(future)),
        }
    }

    /// Creates an already populated result.
    pub fn ready(value: T) -> Self {
        LazyResult {
            state: State::Populated(value),
        }
    }

    /// Returns true once the outcome is known.
    pub fn is_populated(&self) -> bool {
        !matches!(self.state, State::Unpopulated(_))
    }

    /// Returns the outcome without populating.
    pub fn try_get(&self) -> Option<Result<&T, &E>> {
        match &self.state {
            State::Unpopulated(_) => None,
            State::Populated(value) => Some(Ok(value)),
            State::Failed(err) => Some(Err(err)),
        }
    }

    /// Populates the result if needed and returns the outcome.
    pub async fn resolve(&mut self) -> Result<&T, &E> {
        if let State::Unpopulated(future) = &mut self.state {
            let outcome = future.as_mut().await;
            self.state = match outcome {
                Ok(value) => State::Populated(value),
                Err(err) => State::Failed(err),
            };
        }
        match &self.state {
            State::Populated(value) => Ok(value),
            State::Failed(err) => Err(err),
            State::Unpopulated(_) => unreachable!("population future completed above"),
        }
    }

    /// Populates the result if needed and takes ownership of the outcome.
    pub async fn into_result(mut self) -> Result<T, E> {
        if let State::Unpopulated(future) = &mut self.state {
            return future.as_mut().await;
        }
        match self.state {
            State::Populated(value) => Ok(value),
            State::Failed(err) => Err(err),
            State::Unpopulated(_) => unreachable!("handled above"),
        }
    }
}
