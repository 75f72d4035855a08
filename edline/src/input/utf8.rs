// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! UTF-8 text input decoding.
//!
//! Multi-byte sequences accumulate until complete; malformed input decodes as
//! U+FFFD REPLACEMENT CHARACTER, consuming one byte, so garbage on the wire
//! can never corrupt the edit buffer or stall the decoder.

use super::key_event::{InputEvent, KeyCode, KeyPress};
use super::parser::Parsed;

/// Mask/pattern for UTF-8 continuation bytes (`10xxxxxx`).
const CONTINUATION_MASK: u8 = 0b1100_0000;
const CONTINUATION_PATTERN: u8 = 0b1000_0000;

/// Expected total length of a UTF-8 sequence from its first byte, or `None`
/// for bytes that cannot start a sequence.
#[must_use]
pub fn utf8_sequence_len(first_byte: u8) -> Option<usize> {
    match first_byte {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Parse one code point of text input from the front of `buffer`.
///
/// Returns [`Parsed::Incomplete`] when the leading byte promises more bytes
/// than the buffer holds (and the bytes so far are plausible continuations);
/// the device will read more before retrying. Anything malformed becomes
/// `U+FFFD` consuming a single byte.
#[must_use]
pub fn parse_utf8_text(buffer: &[u8]) -> Parsed {
    let Some(&first_byte) = buffer.first() else {
        return Parsed::Incomplete;
    };

    let replacement = || Parsed::Event {
        event: InputEvent::Keyboard(KeyPress::plain(KeyCode::Char('\u{FFFD}'))),
        consumed: 1,
    };

    let Some(required_len) = utf8_sequence_len(first_byte) else {
        // Invalid leading byte (stray continuation, 0xC0/0xC1, 0xF5..).
        return replacement();
    };

    if required_len == 1 {
        return Parsed::Event {
            event: InputEvent::Keyboard(KeyPress::plain(KeyCode::Char(char::from(first_byte)))),
            consumed: 1,
        };
    }

    // Check the continuation bytes we already have.
    for &byte in buffer.iter().skip(1).take(required_len - 1) {
        if byte & CONTINUATION_MASK != CONTINUATION_PATTERN {
            return replacement();
        }
    }

    if buffer.len() < required_len {
        return Parsed::Incomplete;
    }

    // All continuations are well formed; let the stdlib validate the scalar
    // value (overlong encodings and surrogates fail here).
    match std::str::from_utf8(&buffer[..required_len]) {
        Ok(text) => match text.chars().next() {
            Some(ch) => Parsed::Event {
                event: InputEvent::Keyboard(KeyPress::plain(KeyCode::Char(ch))),
                consumed: required_len,
            },
            None => replacement(),
        },
        Err(_) => replacement(),
    }
}
