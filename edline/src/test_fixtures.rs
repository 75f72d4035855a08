// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Shared test doubles. Public so doc examples and downstream hosts can drive
//! the engine without a real terminal.

use std::io::{Result, Write};
use std::sync::{Arc, Mutex};

use strip_ansi_escapes::strip;

/// You can safely clone this struct; the inner buffer is shared via [`Arc`],
/// so a clone observes everything written through the original.
#[derive(Clone, Debug, Default)]
pub struct StdoutMock {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl StdoutMock {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// # Panics
    ///
    /// Panics if the lock is poisoned (a writer thread panicked mid-write).
    #[must_use]
    pub fn get_copy_of_buffer(&self) -> Vec<u8> { self.buffer.lock().unwrap().clone() }

    /// # Panics
    ///
    /// Panics if the lock is poisoned or the captured bytes are not UTF-8.
    #[must_use]
    pub fn get_copy_of_buffer_as_string(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).expect("utf8")
    }

    /// Captured output with ANSI escape sequences removed, for asserting on
    /// visible text only.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned or the captured bytes are not UTF-8.
    #[must_use]
    pub fn get_copy_of_buffer_as_string_strip_ansi(&self) -> String {
        let stripped = strip(self.get_copy_of_buffer());
        String::from_utf8(stripped).expect("utf8")
    }
}

impl Write for StdoutMock {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}
