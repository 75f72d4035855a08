// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Buffered terminal output.
//!
//! The renderer queues text and escape sequences here and flushes once per
//! frame, so a frame is a single `write` syscall and never tears. SGR
//! sequences are gated on the color switch; cursor movement and erase
//! sequences always pass through (they are correctness, not decoration).

use std::io::{self, Write, stdout};

use crate::ansi::csi_codes::{BRACKETED_PASTE_DISABLE, BRACKETED_PASTE_ENABLE};
use crate::ansi::sequences::{CsiSequence, SgrCode};

/// Write end of the terminal. One per `read_line` call, wrapping stdout in
/// production and a capture buffer in tests.
pub struct OutputDevice {
    sink: Box<dyn Write + Send>,
    queue: String,
    color_enabled: bool,
}

impl std::fmt::Debug for OutputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDevice")
            .field("queue", &self.queue)
            .field("color_enabled", &self.color_enabled)
            .finish_non_exhaustive()
    }
}

impl OutputDevice {
    #[must_use]
    pub fn new_stdout(color_enabled: bool) -> Self { Self::new(Box::new(stdout()), color_enabled) }

    #[must_use]
    pub fn new(sink: Box<dyn Write + Send>, color_enabled: bool) -> Self {
        Self {
            sink,
            queue: String::with_capacity(256),
            color_enabled,
        }
    }

    #[must_use]
    pub fn color_enabled(&self) -> bool { self.color_enabled }

    /// Queue plain text (may contain pre-painted escapes from a highlighter;
    /// those were produced under the same color gate).
    pub fn text(&mut self, text: &str) { self.queue.push_str(text); }

    /// Queue a cursor movement / erase sequence.
    pub fn seq(&mut self, sequence: CsiSequence) {
        use std::fmt::Write as _;
        let _unused = write!(self.queue, "{sequence}");
    }

    /// Queue an SGR attribute; dropped entirely when color is off.
    pub fn sgr(&mut self, code: SgrCode) {
        if self.color_enabled {
            use std::fmt::Write as _;
            let _unused = write!(self.queue, "{code}");
        }
    }

    /// Queue a hard newline. Raw mode disables OPOST, so `\n` alone does not
    /// return the carriage.
    pub fn newline(&mut self) { self.queue.push_str("\r\n"); }

    /// Queue the bell.
    pub fn bell(&mut self) { self.seq(CsiSequence::Bell); }

    /// Ask the terminal to wrap pasted input in bracketed paste markers.
    pub fn enable_bracketed_paste(&mut self) { self.queue.push_str(BRACKETED_PASTE_ENABLE); }

    /// Cancel the bracketed paste request.
    pub fn disable_bracketed_paste(&mut self) { self.queue.push_str(BRACKETED_PASTE_DISABLE); }

    /// Write the queued frame to the sink in one shot.
    ///
    /// # Errors
    ///
    /// Underlying write/flush failures; the queue is cleared either way.
    pub fn flush(&mut self) -> io::Result<()> {
        let frame = std::mem::take(&mut self.queue);
        self.sink.write_all(frame.as_bytes())?;
        self.sink.flush()
    }
}
