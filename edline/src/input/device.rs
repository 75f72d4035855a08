// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH winsize

//! POSIX blocking input device: stdin bytes + SIGWINCH, one `mio` poll.
//!
//! `next_event()` parks on [`mio::Poll`] with stdin and a SIGWINCH signal fd
//! registered, so a resize wakes the read loop exactly like a keystroke. The
//! only timer in the engine lives here: when the pending buffer is a lone
//! `ESC` (or an escape prefix cut mid-flight), the poll runs with a
//! [`ESC_DEADLINE`] timeout; expiry resolves the `ESC` into the Esc key.
//!
//! stdin is switched to non-blocking for the lifetime of the device (mio
//! readiness is edge-oriented, so reads must drain until `WouldBlock`); the
//! original flags are restored on drop.

use std::io::{self, stdin};
use std::os::fd::AsRawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use rustix::fs::{OFlags, fcntl_getfl, fcntl_setfl};
use signal_hook::consts::SIGWINCH;
use signal_hook_mio::v1_0::Signals;

use super::key_event::InputEvent;
use super::parser::{Parsed, lone_esc_event, try_parse_input_event};
use crate::ansi::csi_codes::ANSI_ESC;
use crate::terminal::size::get_terminal_size;

const TOKEN_STDIN: Token = Token(0);
const TOKEN_SIGWINCH: Token = Token(1);

/// How long a lone `ESC` may sit in the buffer before it becomes the Esc key.
pub const ESC_DEADLINE: Duration = Duration::from_millis(100);

/// Blocking decoder over stdin. One instance per `read_line` call.
pub struct InputDevice {
    poll: Poll,
    events: Events,
    signals: Signals,
    pending: Vec<u8>,
    saved_flags: OFlags,
}

impl std::fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDevice")
            .field("pending_bytes", &self.pending.len())
            .field("saved_flags", &self.saved_flags)
            .finish_non_exhaustive()
    }
}

impl InputDevice {
    /// Register stdin and SIGWINCH with a fresh poll, and switch stdin to
    /// non-blocking.
    ///
    /// # Errors
    ///
    /// Any failure registering the poll sources or changing the fd flags.
    pub fn new() -> io::Result<Self> {
        let poll = Poll::new()?;
        let stdin_fd = stdin().as_raw_fd();
        poll.registry()
            .register(&mut SourceFd(&stdin_fd), TOKEN_STDIN, Interest::READABLE)?;

        let mut signals = Signals::new([SIGWINCH])?;
        poll.registry()
            .register(&mut signals, TOKEN_SIGWINCH, Interest::READABLE)?;

        let saved_flags = fcntl_getfl(stdin())?;
        fcntl_setfl(stdin(), saved_flags | OFlags::NONBLOCK)?;

        Ok(Self {
            poll,
            events: Events::with_capacity(8),
            signals,
            pending: Vec::with_capacity(64),
            saved_flags,
        })
    }

    /// Block until the next event. `Ok(None)` means stdin reached EOF with
    /// nothing left to decode (the terminal went away).
    ///
    /// # Errors
    ///
    /// Terminal read failures. `Interrupted` polls are retried internally.
    pub fn next_event(&mut self) -> io::Result<Option<InputEvent>> {
        loop {
            match try_parse_input_event(&self.pending) {
                Parsed::Event { event, consumed } => {
                    self.pending.drain(..consumed);
                    return Ok(Some(event));
                }
                Parsed::Ignored { consumed } => {
                    self.pending.drain(..consumed);
                }
                Parsed::Incomplete => {
                    let deadline = self
                        .pending
                        .first()
                        .filter(|&&byte| byte == ANSI_ESC)
                        .map(|_| ESC_DEADLINE);

                    match self.wait_for_readiness(deadline)? {
                        Readiness::Stdin => {
                            let still_open = self.fill_pending()?;
                            if !still_open && self.pending.is_empty() {
                                return Ok(None);
                            }
                        }
                        Readiness::Winch => {
                            return Ok(Some(InputEvent::Resize(get_terminal_size())));
                        }
                        Readiness::TimedOut => {
                            // The ESC is the Esc key; whatever trails it (if
                            // anything) re-parses as its own input.
                            self.pending.drain(..1);
                            return Ok(Some(lone_esc_event()));
                        }
                    }
                }
            }
        }
    }

    fn wait_for_readiness(&mut self, timeout: Option<Duration>) -> io::Result<Readiness> {
        loop {
            match self.poll.poll(&mut self.events, timeout) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }

            if self.events.is_empty() {
                return Ok(Readiness::TimedOut);
            }

            let mut saw_winch = false;
            let mut saw_stdin = false;
            for event in &self.events {
                match event.token() {
                    TOKEN_SIGWINCH => saw_winch = true,
                    TOKEN_STDIN => saw_stdin = true,
                    _ => {}
                }
            }

            if saw_winch {
                // Drain the signal fd so the next SIGWINCH re-arms readiness.
                for _signal in self.signals.pending() {}
                return Ok(Readiness::Winch);
            }
            if saw_stdin {
                return Ok(Readiness::Stdin);
            }
        }
    }

    /// Drain stdin into the pending buffer until `WouldBlock`. Returns
    /// `false` once the stream has reached EOF. Reads go straight to the fd,
    /// bypassing std's line buffering (which would fight the poll).
    fn fill_pending(&mut self) -> io::Result<bool> {
        let mut chunk = [0u8; 1024];
        loop {
            match rustix::io::read(stdin(), &mut chunk) {
                Ok(0) => return Ok(false),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(err) if err == rustix::io::Errno::AGAIN => return Ok(true),
                Err(err) if err == rustix::io::Errno::INTR => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}

enum Readiness {
    Stdin,
    Winch,
    TimedOut,
}

impl Drop for InputDevice {
    fn drop(&mut self) {
        // Restore the original stdin flags; ignore failure (the terminal may
        // already be gone).
        let _unused = fcntl_setfl(stdin(), self.saved_flags);
    }
}
