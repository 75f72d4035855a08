// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Bracketed paste capture.
//!
//! After the writer requests `CSI ? 2004 h`, terminals wrap pasted text in
//! `CSI 200~` / `CSI 201~`. The whole block becomes one [`InputEvent::Paste`]
//! so pasted newlines never trigger key dispatch. The payload inserts
//! verbatim — newlines, tabs, and control bytes included — with the single
//! exception of NUL, which is dropped.

use super::key_event::InputEvent;
use super::parser::Parsed;
use crate::ansi::csi_codes::{PASTE_BEGIN, PASTE_END};

/// True when `buffer` is a proper prefix of the paste-begin marker (more
/// bytes must arrive before routing can decide).
#[must_use]
pub fn is_paste_begin_prefix(buffer: &[u8]) -> bool {
    buffer.len() < PASTE_BEGIN.len() && PASTE_BEGIN.starts_with(buffer)
}

/// Parse a complete paste block from the front of `buffer`.
///
/// `buffer` must start with the begin marker. Returns [`Parsed::Incomplete`]
/// until the end marker arrives.
#[must_use]
pub fn parse_paste_block(buffer: &[u8]) -> Parsed {
    debug_assert!(buffer.starts_with(PASTE_BEGIN));

    let payload_start = PASTE_BEGIN.len();
    let haystack = &buffer[payload_start..];

    let Some(end_at) = find_marker(haystack, PASTE_END) else {
        return Parsed::Incomplete;
    };

    let payload = &haystack[..end_at];
    let consumed = payload_start + end_at + PASTE_END.len();

    Parsed::Event {
        event: InputEvent::Paste(sanitize_payload(payload)),
        consumed,
    }
}

fn find_marker(haystack: &[u8], marker: &[u8]) -> Option<usize> {
    if haystack.len() < marker.len() {
        return None;
    }
    (0..=haystack.len() - marker.len()).find(|&idx| haystack[idx..].starts_with(marker))
}

fn sanitize_payload(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload)
        .chars()
        .filter(|&ch| ch != '\0')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paste_bytes(payload: &[u8]) -> Vec<u8> {
        let mut bytes = PASTE_BEGIN.to_vec();
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(PASTE_END);
        bytes
    }

    #[test]
    fn test_simple_paste() {
        let bytes = paste_bytes(b"hello world");
        let Parsed::Event { event, consumed } = parse_paste_block(&bytes) else {
            panic!("expected complete paste");
        };
        assert_eq!(event, InputEvent::Paste("hello world".into()));
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_paste_with_newlines_and_controls() {
        // Payload arrives verbatim, including CR, CRLF, and tab bytes.
        let bytes = paste_bytes(b"line1\r\nline2\rline3\ttab");
        let Parsed::Event { event, .. } = parse_paste_block(&bytes) else {
            panic!("expected complete paste");
        };
        assert_eq!(
            event,
            InputEvent::Paste("line1\r\nline2\rline3\ttab".into())
        );
    }

    #[test]
    fn test_paste_drops_nul() {
        let bytes = paste_bytes(b"a\0b");
        let Parsed::Event { event, .. } = parse_paste_block(&bytes) else {
            panic!("expected complete paste");
        };
        assert_eq!(event, InputEvent::Paste("ab".into()));
    }

    #[test]
    fn test_unterminated_paste_waits() {
        let mut bytes = PASTE_BEGIN.to_vec();
        bytes.extend_from_slice(b"partial payload");
        assert_eq!(parse_paste_block(&bytes), Parsed::Incomplete);
    }

    #[test]
    fn test_paste_begin_prefix_detection() {
        assert!(is_paste_begin_prefix(b"\x1b[20"));
        assert!(is_paste_begin_prefix(b"\x1b[200"));
        assert!(!is_paste_begin_prefix(b"\x1b[201"));
        assert!(!is_paste_begin_prefix(PASTE_BEGIN));
    }

    #[test]
    fn test_trailing_bytes_not_consumed() {
        let mut bytes = paste_bytes(b"xyz");
        bytes.extend_from_slice(b"after");
        let Parsed::Event { consumed, .. } = parse_paste_block(&bytes) else {
            panic!("expected complete paste");
        };
        assert_eq!(consumed, bytes.len() - "after".len());
    }
}
