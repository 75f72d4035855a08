// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Input parse routing: raw bytes in, [`InputEvent`]s out.
//!
//! [`try_parse_input_event`] inspects the first one or two bytes of the
//! pending buffer and dispatches to the specialized parsers:
//!
//! ```text
//! pending bytes
//!    │
//!    ├─ 0x1B alone ──────────────→ Incomplete (device owns the 100 ms ESC deadline)
//!    ├─ 0x1B '[' 200~ ... 201~ ──→ paste capture
//!    ├─ 0x1B '[' ... ────────────→ CSI keyboard (unknown finals ignored)
//!    ├─ 0x1B 'O' ... ────────────→ SS3 application keys
//!    ├─ 0x1B other ──────────────→ Alt+letter, else lone Esc
//!    ├─ < 0x20 / 0x7F ───────────→ named controls
//!    └─ everything else ─────────→ UTF-8 text (invalid → U+FFFD)
//! ```
//!
//! The parser is pure: it never blocks and never consults a clock, which is
//! what makes the key decode table testable byte-for-byte. The one thing it
//! cannot decide on its own — whether a lone `ESC` is the Esc key or the
//! start of a sequence still in flight — it reports as [`Parsed::Incomplete`]
//! and leaves to the device's read deadline.

use super::key_event::{InputEvent, KeyCode, KeyPress};
use super::keyboard::{parse_alt_letter, parse_control_character, parse_csi_sequence,
                      parse_ss3_sequence};
use super::paste::{is_paste_begin_prefix, parse_paste_block};
use super::utf8::parse_utf8_text;
use crate::ansi::csi_codes::{ANSI_CSI_BRACKET, ANSI_ESC, ANSI_SS3_O, PASTE_BEGIN};

/// Outcome of one parse attempt against the front of the pending buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed {
    /// A complete event; drain `consumed` bytes.
    Event { event: InputEvent, consumed: usize },
    /// More bytes are needed before the front of the buffer can be decided.
    Incomplete,
    /// A complete sequence with no meaning for the editor (focus reports,
    /// mouse reports, echoed paste markers); drain `consumed` bytes silently.
    Ignored { consumed: usize },
}

/// The event the device emits when the ESC deadline expires on a lone `ESC`.
#[must_use]
pub fn lone_esc_event() -> InputEvent { InputEvent::Keyboard(KeyPress::plain(KeyCode::Esc)) }

/// Try to parse one input event from the front of `buffer`.
#[must_use]
pub fn try_parse_input_event(buffer: &[u8]) -> Parsed {
    let Some(&first) = buffer.first() else {
        return Parsed::Incomplete;
    };

    if first != ANSI_ESC {
        if let Some((event, consumed)) = parse_control_character(buffer) {
            return Parsed::Event { event, consumed };
        }
        return parse_utf8_text(buffer);
    }

    if buffer.len() == 1 {
        // Lone ESC: either the Esc key or a sequence cut mid-flight. The
        // device resolves this with its read deadline.
        return Parsed::Incomplete;
    }

    match buffer[1] {
        ANSI_CSI_BRACKET => {
            if is_paste_begin_prefix(buffer) {
                return Parsed::Incomplete;
            }
            if buffer.starts_with(PASTE_BEGIN) {
                return parse_paste_block(buffer);
            }
            parse_csi_sequence(buffer)
        }
        ANSI_SS3_O => parse_ss3_sequence(buffer),
        _ => match parse_alt_letter(buffer) {
            Some((event, consumed)) => Parsed::Event { event, consumed },
            // ESC + something that is not a chord: surface the Esc key and
            // leave the rest for the next parse.
            None => Parsed::Event {
                event: lone_esc_event(),
                consumed: 1,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::csi_codes::PASTE_END;
    use crate::input::key_event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn expect_event(buffer: &[u8], expected: InputEvent, expected_consumed: usize) {
        let Parsed::Event { event, consumed } = try_parse_input_event(buffer) else {
            panic!("expected event for {buffer:x?}");
        };
        assert_eq!(event, expected);
        assert_eq!(consumed, expected_consumed);
    }

    #[test]
    fn test_empty_buffer_is_incomplete() {
        assert_eq!(try_parse_input_event(&[]), Parsed::Incomplete);
    }

    #[test]
    fn test_lone_esc_is_incomplete() {
        // Test: the router cannot decide a lone ESC; the device deadline does.
        assert_eq!(try_parse_input_event(&[0x1B]), Parsed::Incomplete);
    }

    #[test]
    fn test_routes_to_control_parser() {
        expect_event(
            &[0x12],
            InputEvent::Keyboard(KeyPress::ctrl(KeyCode::Char('r'))),
            1,
        );
    }

    #[test]
    fn test_routes_to_utf8_parser() {
        expect_event(
            "中".as_bytes(),
            InputEvent::Keyboard(KeyPress::plain(KeyCode::Char('中'))),
            3,
        );
    }

    #[test]
    fn test_routes_to_csi_parser() {
        expect_event(
            b"\x1b[A",
            InputEvent::Keyboard(KeyPress::plain(KeyCode::Up)),
            3,
        );
    }

    #[test]
    fn test_routes_to_ss3_parser() {
        expect_event(
            b"\x1bOP",
            InputEvent::Keyboard(KeyPress::plain(KeyCode::Function(1))),
            3,
        );
    }

    #[test]
    fn test_routes_to_alt_letter() {
        expect_event(
            b"\x1bf",
            InputEvent::Keyboard(KeyPress::alt(KeyCode::Char('f'))),
            2,
        );
    }

    #[test]
    fn test_esc_plus_garbage_is_esc() {
        expect_event(&[0x1B, 0xFF], lone_esc_event(), 1);
    }

    #[test]
    fn test_routes_paste_block() {
        let mut bytes = PASTE_BEGIN.to_vec();
        bytes.extend_from_slice(b"pasted");
        bytes.extend_from_slice(PASTE_END);
        expect_event(&bytes, InputEvent::Paste("pasted".into()), bytes.len());
    }

    #[test]
    fn test_partial_paste_marker_waits() {
        assert_eq!(try_parse_input_event(b"\x1b[200"), Parsed::Incomplete);
    }

    #[test]
    fn test_echoed_paste_end_marker_is_ignored() {
        // A terminal without bracketed paste may echo the end marker alone;
        // it must be swallowed, never inserted.
        assert_eq!(
            try_parse_input_event(PASTE_END),
            Parsed::Ignored {
                consumed: PASTE_END.len()
            }
        );
    }

    #[test]
    fn test_shift_tab() {
        expect_event(
            b"\x1b[Z",
            InputEvent::Keyboard(KeyPress {
                code: KeyCode::BackTab,
                modifiers: KeyModifiers::SHIFT,
            }),
            3,
        );
    }
}
