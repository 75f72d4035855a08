// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw-mode input decoding: bytes (or console records) to [`InputEvent`]s.
//!
//! Layering, bottom-up: [`key_event`] defines the event shape; [`utf8`],
//! [`keyboard`], and [`paste`] are the specialized parsers; [`parser`] routes
//! between them; the platform device owns blocking, the SIGWINCH wake, and
//! the lone-ESC deadline.

pub mod key_event;
pub mod keyboard;
pub mod parser;
pub mod paste;
pub mod utf8;

#[cfg(unix)]
mod device;
#[cfg(windows)]
mod device_windows;

#[cfg(unix)]
pub use device::{ESC_DEADLINE, InputDevice};
#[cfg(windows)]
pub use device_windows::InputDevice;
pub use key_event::{InputEvent, KeyCode, KeyModifiers, KeyPress};
pub use parser::{Parsed, try_parse_input_event};
