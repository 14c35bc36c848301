/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Seekable request content.
//!
//! A [`ContentSource`] wraps any `Read + Seek` resource. Every full read starts from offset 0,
//! so the same source can be sent more than once (for example when a request is retried).

use bytes::Bytes;
use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default chunk size used by [`ContentSource::chunks`].
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/// Shared handle to a seekable resource.
#[derive(Clone)]
pub struct ContentSource {
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
    chunk_size: usize,
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSource")
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ContentSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ContentSource {
    /// Wraps a seekable resource.
    pub fn new<R>(resource: R) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        ContentSource {
            inner: Arc::new(Mutex::new(Box::new(resource))),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Wraps in-memory content.
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(content.into()))
    }

    /// Sets the size of the chunks yielded by [`chunks`](Self::chunks).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Box<dyn ReadSeek>>> {
        lock(&self.inner)
    }

    /// Total size of the resource in bytes.
    pub fn length(&self) -> io::Result<u64> {
        let mut resource = self.lock()?;
        let end = resource.seek(SeekFrom::End(0))?;
        resource.seek(SeekFrom::Start(0))?;
        Ok(end)
    }

    /// Reads the whole resource from the start.
    pub fn read_all(&self) -> io::Result<Bytes> {
        let mut resource = self.lock()?;
        resource.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        resource.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Returns an iterator over the resource in chunks, starting from the beginning.
    pub fn chunks(&self) -> io::Result<Chunks> {
        self.lock()?.seek(SeekFrom::Start(0))?;
        Ok(Chunks {
            inner: self.inner.clone(),
            chunk_size: self.chunk_size,
            done: false,
        })
    }
}

fn lock(inner: &Mutex<Box<dyn ReadSeek>>) -> io::Result<MutexGuard<'_, Box<dyn ReadSeek>>> {
    inner
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "content source lock poisoned"))
}

/// Iterator over the chunks of a [`ContentSource`].
pub struct Chunks {
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
    chunk_size: usize,
    done: bool,
}

impl fmt::Debug for Chunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunks")
            .field("chunk_size", &self.chunk_size)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Iterator for Chunks {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = lock(&self.inner).and_then(|mut resource| {
            let mut buf = Vec::with_capacity(self.chunk_size);
            (&mut *resource)
                .take(self.chunk_size as u64)
                .read_to_end(&mut buf)?;
            Ok(buf)
        });
        match result {
            Ok(buf) if buf.is_empty() => {
                self.done = true;
                None
            }
            Ok(buf) => Some(Ok(Bytes::from(buf))),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
