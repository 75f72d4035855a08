// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words xterm rxvt

//! Keyboard decoding: control characters, Alt+letter, CSI and SS3 sequences.
//!
//! CSI format: `ESC [ param...;param [intermediate...] final` with parameter
//! bytes `0x30-0x3F`, intermediate bytes `0x20-0x2F`, and a final byte
//! `0x40-0x7E`. Modifier digits follow the xterm convention: the parameter is
//! `1 + bitmask` with bit 0 = Shift, bit 1 = Alt, bit 2 = Ctrl.

use smallvec::SmallVec;

use super::key_event::{InputEvent, KeyCode, KeyModifiers, KeyPress};
use super::parser::Parsed;
use crate::ansi::csi_codes::{ANSI_CSI_BRACKET, ANSI_ESC, ANSI_SS3_O, ARROW_DOWN_FINAL,
                             ARROW_LEFT_FINAL, ARROW_RIGHT_FINAL, ARROW_UP_FINAL, ASCII_DEL,
                             BACKTAB_FINAL, CSI_INTERMEDIATE_BYTE_MAX, CSI_INTERMEDIATE_BYTE_MIN,
                             CSI_PARAM_BYTE_MAX, CSI_PARAM_BYTE_MIN, CTRL_CHAR_RANGE_MAX,
                             CTRL_TO_LOWERCASE_MASK, CTRL_TO_PUNCT_MASK, END_FINAL,
                             FUNCTION_KEY_TERMINATOR, HOME_FINAL, PARAM_SEPARATOR,
                             PRINTABLE_ASCII_MAX, PRINTABLE_ASCII_MIN, SPECIAL_KEY_DELETE,
                             SPECIAL_KEY_END_4, SPECIAL_KEY_END_8, SPECIAL_KEY_HOME_1,
                             SPECIAL_KEY_HOME_7, SPECIAL_KEY_INSERT, SPECIAL_KEY_PAGE_DOWN,
                             SPECIAL_KEY_PAGE_UP};

/// CSI sequences carry at most a handful of parameters; keep them inline.
type CsiParams = SmallVec<[u16; 4]>;

/// Parse a single control byte (0x00-0x1F, plus DEL) into a key event.
///
/// Returns `None` for ESC (handled by the router) and for non-control bytes.
#[must_use]
pub fn parse_control_character(buffer: &[u8]) -> Option<(InputEvent, usize)> {
    let &byte = buffer.first()?;

    let key = |press: KeyPress| Some((InputEvent::Keyboard(press), 1));

    // ASCII DEL is the common Backspace encoding.
    if byte == ASCII_DEL {
        return key(KeyPress::plain(KeyCode::Backspace));
    }

    if byte > CTRL_CHAR_RANGE_MAX {
        return None;
    }

    match byte {
        // Ctrl+Space (or Ctrl+@) generates NUL.
        0x00 => key(KeyPress::ctrl(KeyCode::Char(' '))),
        // Tab (0x09), not Ctrl+I.
        0x09 => key(KeyPress::plain(KeyCode::Tab)),
        // Enter sends CR (0x0D) or LF (0x0A) depending on terminal mode.
        0x0A | 0x0D => key(KeyPress::plain(KeyCode::Enter)),
        // Backspace as BS (0x08).
        0x08 => key(KeyPress::plain(KeyCode::Backspace)),
        // ESC - handled in router.
        0x1B => None,
        // Ctrl+A..Ctrl+Z: recover the lowercase letter with `byte | 0x60`.
        0x01..=0x1A => key(KeyPress::ctrl(KeyCode::Char(char::from(
            byte | CTRL_TO_LOWERCASE_MASK,
        )))),
        // Ctrl+\ Ctrl+] Ctrl+^ Ctrl+_: recover punctuation with `byte | 0x40`.
        0x1C..=0x1F => key(KeyPress::ctrl(KeyCode::Char(char::from(
            byte | CTRL_TO_PUNCT_MASK,
        )))),
        _ => None,
    }
}

/// Parse `ESC <byte>` as Alt+key (terminals send Alt as an ESC prefix).
///
/// `ESC DEL` is Alt+Backspace. Returns `None` when the second byte is not
/// printable ASCII; the router then falls back to a standalone ESC.
#[must_use]
pub fn parse_alt_letter(buffer: &[u8]) -> Option<(InputEvent, usize)> {
    if buffer.len() < 2 || buffer[0] != ANSI_ESC {
        return None;
    }

    let second = buffer[1];

    if second == ASCII_DEL {
        return Some((
            InputEvent::Keyboard(KeyPress::alt(KeyCode::Backspace)),
            2,
        ));
    }

    // Alt+Enter arrives as ESC CR.
    if second == 0x0D || second == 0x0A {
        return Some((InputEvent::Keyboard(KeyPress::alt(KeyCode::Enter)), 2));
    }

    // Ctrl+Alt+letter arrives as ESC followed by the control byte.
    if (0x01..=0x1A).contains(&second) {
        let letter = char::from(second | CTRL_TO_LOWERCASE_MASK);
        return Some((
            InputEvent::Keyboard(KeyPress {
                code: KeyCode::Char(letter),
                modifiers: KeyModifiers {
                    shift: false,
                    ctrl: true,
                    alt: true,
                },
            }),
            2,
        ));
    }

    if !(PRINTABLE_ASCII_MIN..=PRINTABLE_ASCII_MAX).contains(&second) {
        return None;
    }

    Some((
        InputEvent::Keyboard(KeyPress::alt(KeyCode::Char(second as char))),
        2,
    ))
}

/// Parse a CSI keyboard sequence (`ESC [ ...`).
///
/// [`Parsed::Incomplete`] while the final byte has not arrived;
/// [`Parsed::Ignored`] for complete sequences that are not keys we know
/// (focus events, echoed paste markers on terminals without bracketed paste,
/// legacy mouse reports).
#[must_use]
pub fn parse_csi_sequence(buffer: &[u8]) -> Parsed {
    if buffer.len() < 2 || buffer[0] != ANSI_ESC || buffer[1] != ANSI_CSI_BRACKET {
        return Parsed::Incomplete;
    }

    let mut params = CsiParams::new();
    let mut acc: u16 = 0;
    let mut saw_digit = false;
    let mut final_byte = None;
    let mut scanned = 0;

    for (idx, &byte) in buffer[2..].iter().enumerate() {
        scanned = idx + 1;
        if byte.is_ascii_digit() {
            acc = acc
                .saturating_mul(10)
                .saturating_add(u16::from(byte - b'0'));
            saw_digit = true;
        } else if byte == PARAM_SEPARATOR {
            params.push(acc);
            acc = 0;
            saw_digit = false;
        } else if (CSI_PARAM_BYTE_MIN..=CSI_PARAM_BYTE_MAX).contains(&byte)
            || (CSI_INTERMEDIATE_BYTE_MIN..=CSI_INTERMEDIATE_BYTE_MAX).contains(&byte)
        {
            // Private parameter / intermediate bytes (`< = > ?` etc.). Seen in
            // mouse and mode reports; we scan past them and ignore the result.
        } else if (u32::from(byte) >= 0x40) && (u32::from(byte) <= 0x7E) {
            if saw_digit || !params.is_empty() {
                params.push(acc);
            }
            final_byte = Some(byte);
            break;
        } else {
            // Not a CSI byte at all; drop the malformed prefix.
            return Parsed::Ignored { consumed: 2 + scanned };
        }
    }

    let Some(final_byte) = final_byte else {
        return Parsed::Incomplete;
    };

    let consumed = 2 + scanned;

    // Private-prefixed sequences (e.g. SGR mouse `CSI < ... M`) are not keys.
    if buffer.get(2).is_some_and(|&b| (0x3C..=0x3F).contains(&b)) {
        return Parsed::Ignored { consumed };
    }

    match decode_csi_key(&params, final_byte) {
        Some(press) => Parsed::Event {
            event: InputEvent::Keyboard(press),
            consumed,
        },
        None => Parsed::Ignored { consumed },
    }
}

/// Parse an SS3 sequence (`ESC O <byte>`), sent by application-mode keypads.
#[must_use]
pub fn parse_ss3_sequence(buffer: &[u8]) -> Parsed {
    if buffer.len() < 2 || buffer[0] != ANSI_ESC || buffer[1] != ANSI_SS3_O {
        return Parsed::Incomplete;
    }
    let Some(&command) = buffer.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match command {
        ARROW_UP_FINAL => Some(KeyCode::Up),
        ARROW_DOWN_FINAL => Some(KeyCode::Down),
        ARROW_RIGHT_FINAL => Some(KeyCode::Right),
        ARROW_LEFT_FINAL => Some(KeyCode::Left),
        HOME_FINAL => Some(KeyCode::Home),
        END_FINAL => Some(KeyCode::End),
        b'P' => Some(KeyCode::Function(1)),
        b'Q' => Some(KeyCode::Function(2)),
        b'R' => Some(KeyCode::Function(3)),
        b'S' => Some(KeyCode::Function(4)),
        _ => None,
    };

    match code {
        Some(code) => Parsed::Event {
            event: InputEvent::Keyboard(KeyPress::plain(code)),
            consumed: 3,
        },
        None => Parsed::Ignored { consumed: 3 },
    }
}

/// Map decoded CSI parameters + final byte to a key press.
fn decode_csi_key(params: &[u16], final_byte: u8) -> Option<KeyPress> {
    let plain = KeyModifiers::NONE;

    match (params, final_byte) {
        // Bare cursor keys: CSI A/B/C/D/H/F.
        ([], ARROW_UP_FINAL) => Some(KeyPress::plain(KeyCode::Up)),
        ([], ARROW_DOWN_FINAL) => Some(KeyPress::plain(KeyCode::Down)),
        ([], ARROW_RIGHT_FINAL) => Some(KeyPress::plain(KeyCode::Right)),
        ([], ARROW_LEFT_FINAL) => Some(KeyPress::plain(KeyCode::Left)),
        ([], HOME_FINAL) => Some(KeyPress::plain(KeyCode::Home)),
        ([], END_FINAL) => Some(KeyPress::plain(KeyCode::End)),

        // Shift+Tab: CSI Z.
        ([], BACKTAB_FINAL) => Some(KeyPress {
            code: KeyCode::BackTab,
            modifiers: KeyModifiers::SHIFT,
        }),

        // Modified cursor keys: CSI 1 ; m A/B/C/D/H/F.
        ([1, modifier], ARROW_UP_FINAL) => modified(KeyCode::Up, *modifier),
        ([1, modifier], ARROW_DOWN_FINAL) => modified(KeyCode::Down, *modifier),
        ([1, modifier], ARROW_RIGHT_FINAL) => modified(KeyCode::Right, *modifier),
        ([1, modifier], ARROW_LEFT_FINAL) => modified(KeyCode::Left, *modifier),
        ([1, modifier], HOME_FINAL) => modified(KeyCode::Home, *modifier),
        ([1, modifier], END_FINAL) => modified(KeyCode::End, *modifier),

        // Modified Enter (kitty-style CSI 27;m;13~ is out of scope; xterm
        // sends CSI 13 ; m u on some configs).
        ([13, modifier], b'u') => modified(KeyCode::Enter, *modifier),

        // Special / function keys: CSI n ~ and CSI n ; m ~.
        ([n], FUNCTION_KEY_TERMINATOR) => {
            decode_tilde_key(*n).map(|code| KeyPress { code, modifiers: plain })
        }
        ([n, modifier], FUNCTION_KEY_TERMINATOR) => {
            decode_tilde_key(*n).and_then(|code| modified(code, *modifier))
        }

        _ => None,
    }
}

fn modified(code: KeyCode, modifier_param: u16) -> Option<KeyPress> {
    Some(KeyPress {
        code,
        modifiers: decode_modifiers(modifier_param),
    })
}

/// xterm modifier parameter: `1 + bitmask`, bit 0 Shift, bit 1 Alt, bit 2 Ctrl.
#[must_use]
pub fn decode_modifiers(modifier_param: u16) -> KeyModifiers {
    let mask = modifier_param.saturating_sub(1);
    KeyModifiers {
        shift: mask & 0b001 != 0,
        alt: mask & 0b010 != 0,
        ctrl: mask & 0b100 != 0,
    }
}

/// `CSI n ~` key numbers.
fn decode_tilde_key(n: u16) -> Option<KeyCode> {
    match n {
        SPECIAL_KEY_HOME_1 | SPECIAL_KEY_HOME_7 => Some(KeyCode::Home),
        SPECIAL_KEY_INSERT => Some(KeyCode::Insert),
        SPECIAL_KEY_DELETE => Some(KeyCode::Delete),
        SPECIAL_KEY_END_4 | SPECIAL_KEY_END_8 => Some(KeyCode::End),
        SPECIAL_KEY_PAGE_UP => Some(KeyCode::PageUp),
        SPECIAL_KEY_PAGE_DOWN => Some(KeyCode::PageDown),
        11..=15 => Some(KeyCode::Function(u8::try_from(n - 10).ok()?)),
        17..=21 => Some(KeyCode::Function(u8::try_from(n - 11).ok()?)),
        23 | 24 => Some(KeyCode::Function(u8::try_from(n - 12).ok()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn expect_key(parsed: Parsed, expected: KeyPress, expected_consumed: usize) {
        let Parsed::Event { event, consumed } = parsed else {
            panic!("expected a key event, got {parsed:?}");
        };
        assert_eq!(event, InputEvent::Keyboard(expected));
        assert_eq!(consumed, expected_consumed);
    }

    #[test]
    fn test_control_letters() {
        // Test: Ctrl+A (0x01) through Ctrl+Z (0x1A) recover the letter.
        let (event, consumed) = parse_control_character(&[0x01]).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::ctrl(KeyCode::Char('a'))));
        assert_eq!(consumed, 1);

        let (event, _) = parse_control_character(&[0x1A]).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::ctrl(KeyCode::Char('z'))));
    }

    #[test]
    fn test_ctrl_underscore() {
        // Test: 0x1F is Ctrl+_ (undo binding).
        let (event, _) = parse_control_character(&[0x1F]).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::ctrl(KeyCode::Char('_'))));
    }

    #[test_case(&[0x09], KeyCode::Tab ; "tab")]
    #[test_case(&[0x0D], KeyCode::Enter ; "enter cr")]
    #[test_case(&[0x0A], KeyCode::Enter ; "enter lf")]
    #[test_case(&[0x08], KeyCode::Backspace ; "backspace bs")]
    #[test_case(&[0x7F], KeyCode::Backspace ; "backspace del")]
    fn test_named_controls(buffer: &[u8], expected: KeyCode) {
        let (event, _) = parse_control_character(buffer).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::plain(expected)));
    }

    #[test]
    fn test_esc_byte_is_not_a_control_key() {
        assert_eq!(parse_control_character(&[0x1B]), None);
    }

    #[test]
    fn test_alt_letter() {
        let (event, consumed) = parse_alt_letter(&[0x1B, b'd']).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::alt(KeyCode::Char('d'))));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_alt_backspace() {
        let (event, _) = parse_alt_letter(&[0x1B, 0x7F]).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::alt(KeyCode::Backspace)));
    }

    #[test]
    fn test_alt_enter() {
        let (event, _) = parse_alt_letter(&[0x1B, 0x0D]).unwrap();
        assert_eq!(event, InputEvent::Keyboard(KeyPress::alt(KeyCode::Enter)));
    }

    #[test_case(b"\x1b[A", KeyCode::Up ; "up")]
    #[test_case(b"\x1b[B", KeyCode::Down ; "down")]
    #[test_case(b"\x1b[C", KeyCode::Right ; "right")]
    #[test_case(b"\x1b[D", KeyCode::Left ; "left")]
    #[test_case(b"\x1b[H", KeyCode::Home ; "home")]
    #[test_case(b"\x1b[F", KeyCode::End ; "end")]
    fn test_csi_bare_cursor_keys(buffer: &[u8], expected: KeyCode) {
        expect_key(
            parse_csi_sequence(buffer),
            KeyPress::plain(expected),
            buffer.len(),
        );
    }

    #[test_case(b"\x1b[3~", KeyCode::Delete ; "delete")]
    #[test_case(b"\x1b[2~", KeyCode::Insert ; "insert")]
    #[test_case(b"\x1b[5~", KeyCode::PageUp ; "page up")]
    #[test_case(b"\x1b[6~", KeyCode::PageDown ; "page down")]
    #[test_case(b"\x1b[1~", KeyCode::Home ; "home vt")]
    #[test_case(b"\x1b[4~", KeyCode::End ; "end vt")]
    #[test_case(b"\x1b[15~", KeyCode::Function(5) ; "f5")]
    #[test_case(b"\x1b[17~", KeyCode::Function(6) ; "f6 skips 16")]
    #[test_case(b"\x1b[24~", KeyCode::Function(12) ; "f12")]
    fn test_csi_tilde_keys(buffer: &[u8], expected: KeyCode) {
        expect_key(
            parse_csi_sequence(buffer),
            KeyPress::plain(expected),
            buffer.len(),
        );
    }

    #[test]
    fn test_csi_modified_arrow() {
        // Test: CSI 1;5C is Ctrl+Right.
        expect_key(
            parse_csi_sequence(b"\x1b[1;5C"),
            KeyPress {
                code: KeyCode::Right,
                modifiers: KeyModifiers::CTRL,
            },
            6,
        );
        // Test: CSI 1;3D is Alt+Left.
        expect_key(
            parse_csi_sequence(b"\x1b[1;3D"),
            KeyPress {
                code: KeyCode::Left,
                modifiers: KeyModifiers::ALT,
            },
            6,
        );
    }

    #[test]
    fn test_csi_modified_home_end() {
        expect_key(
            parse_csi_sequence(b"\x1b[1;5H"),
            KeyPress {
                code: KeyCode::Home,
                modifiers: KeyModifiers::CTRL,
            },
            6,
        );
        expect_key(
            parse_csi_sequence(b"\x1b[1;5F"),
            KeyPress {
                code: KeyCode::End,
                modifiers: KeyModifiers::CTRL,
            },
            6,
        );
    }

    #[test]
    fn test_csi_backtab() {
        expect_key(
            parse_csi_sequence(b"\x1b[Z"),
            KeyPress {
                code: KeyCode::BackTab,
                modifiers: KeyModifiers::SHIFT,
            },
            3,
        );
    }

    #[test]
    fn test_csi_incomplete_waits() {
        assert_eq!(parse_csi_sequence(b"\x1b["), Parsed::Incomplete);
        assert_eq!(parse_csi_sequence(b"\x1b[1;5"), Parsed::Incomplete);
    }

    #[test]
    fn test_csi_unknown_sequence_is_ignored() {
        // Focus-in event: CSI I.
        assert_eq!(
            parse_csi_sequence(b"\x1b[I"),
            Parsed::Ignored { consumed: 3 }
        );
        // SGR mouse report: CSI < 0;10;20 M.
        assert_eq!(
            parse_csi_sequence(b"\x1b[<0;10;20M"),
            Parsed::Ignored { consumed: 11 }
        );
    }

    #[test_case(b"\x1bOP", KeyCode::Function(1) ; "f1")]
    #[test_case(b"\x1bOS", KeyCode::Function(4) ; "f4")]
    #[test_case(b"\x1bOA", KeyCode::Up ; "app mode up")]
    #[test_case(b"\x1bOH", KeyCode::Home ; "app mode home")]
    fn test_ss3_keys(buffer: &[u8], expected: KeyCode) {
        expect_key(parse_ss3_sequence(buffer), KeyPress::plain(expected), 3);
    }

    #[test]
    fn test_ss3_incomplete_waits() {
        assert_eq!(parse_ss3_sequence(b"\x1bO"), Parsed::Incomplete);
    }

    #[test_case(1, KeyModifiers::NONE ; "no modifier")]
    #[test_case(2, KeyModifiers::SHIFT ; "shift")]
    #[test_case(3, KeyModifiers::ALT ; "alt")]
    #[test_case(5, KeyModifiers::CTRL ; "ctrl")]
    #[test_case(7, KeyModifiers { shift: false, ctrl: true, alt: true } ; "ctrl alt")]
    fn test_decode_modifiers(param: u16, expected: KeyModifiers) {
        assert_eq!(decode_modifiers(param), expected);
    }
}
