//! A cloneable sink that lets several redactors write into one destination.
//!
//! A job's stdout and stderr each get their own [`crate::Redactor`], since a
//! redactor keeps per-stream state. When both should end up in the same log, each
//! redactor writes into a clone of the same [`SharedWriter`], which serializes
//! writes behind a mutex.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
pub struct SharedWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> SharedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, W>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("shared writer lock poisoned"))
    }

    /// Returns the wrapped writer if this is the last handle.
    pub fn try_into_inner(self) -> Result<W, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    // Keeps a whole redacted batch contiguous when several writers interleave.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}
