// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words wcwidth

//! Display width model (wcwidth-like) for cursor placement.
//!
//! The number of terminal cells a code point occupies is 0 (combining marks,
//! zero-width), 1 (most scripts), or 2 (wide East-Asian). Widths come from the
//! compiled Unicode tables in the [`unicode_width`] crate; the ambiguous
//! East-Asian range is terminal dependent, so callers carry a toggle that
//! switches between the narrow and CJK ("ambiguous = wide") tables.
//!
//! Hard tabs are not a property of a code point: they expand to the next
//! multiple of [`TAB_STOP`] columns *from the current column*, so tab-aware
//! measurement always threads a start column through.

use unicode_width::UnicodeWidthChar;

use super::dimens::{ColIndex, ColWidth, width};
use crate::ansi::csi_codes::{ANSI_CSI_BRACKET, ANSI_ESC_CHAR, CSI_FINAL_BYTE_MAX,
                             CSI_FINAL_BYTE_MIN};

/// Tab stops are every 8 columns, matching terminal driver behavior.
pub const TAB_STOP: u16 = 8;

/// Number of cells one code point occupies: 0, 1, or 2.
///
/// Control characters measure 0 here; the renderer never emits them raw (tabs
/// and newlines are handled structurally before width is consulted).
#[must_use]
pub fn char_display_width(ch: char, ambiguous_wide: bool) -> ColWidth {
    let cells = if ambiguous_wide {
        UnicodeWidthChar::width_cjk(ch)
    } else {
        UnicodeWidthChar::width(ch)
    };
    width(cells.unwrap_or(0))
}

/// Column reached after a hard tab starting at `at_col`.
#[must_use]
pub fn next_tab_stop(at_col: ColIndex) -> ColIndex {
    let col = at_col.as_u16();
    ColIndex((col / TAB_STOP + 1) * TAB_STOP)
}

/// Width of a string with no tab or escape handling (plain text measurement).
#[must_use]
pub fn str_display_width(text: &str, ambiguous_wide: bool) -> ColWidth {
    let mut acc = width(0u16);
    for ch in text.chars() {
        acc += char_display_width(ch, ambiguous_wide);
    }
    acc
}

/// Width of a string segment starting at `start_col`, expanding hard tabs to
/// the next multiple of [`TAB_STOP`] and skipping the bytes of any embedded
/// ANSI escape sequences (as produced by a transform-style highlighter).
#[must_use]
pub fn str_display_width_from(text: &str, start_col: ColIndex, ambiguous_wide: bool) -> ColWidth {
    let mut col = start_col;
    let mut iter = text.chars().peekable();
    while let Some(ch) = iter.next() {
        match ch {
            ANSI_ESC_CHAR => {
                // Skip over CSI sequences: ESC [ params... final.
                if iter.peek() == Some(&(ANSI_CSI_BRACKET as char)) {
                    iter.next();
                    for esc_ch in iter.by_ref() {
                        if (CSI_FINAL_BYTE_MIN..=CSI_FINAL_BYTE_MAX).contains(&(esc_ch as u32)) {
                            break;
                        }
                    }
                }
            }
            '\t' => col = next_tab_stop(col),
            _ => col = col.add_width(char_display_width(ch, ambiguous_wide)),
        }
    }
    width(col.as_u16().saturating_sub(start_col.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimens::col;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case('a', 1 ; "ascii is narrow")]
    #[test_case('é', 1 ; "latin with diacritic is narrow")]
    #[test_case('中', 2 ; "cjk ideograph is wide")]
    #[test_case('ｱ', 1 ; "halfwidth katakana is narrow")]
    #[test_case('\u{0301}', 0 ; "combining acute is zero width")]
    #[test_case('\u{200B}', 0 ; "zero width space")]
    fn test_char_display_width(ch: char, expected: u16) {
        assert_eq!(char_display_width(ch, false), width(expected));
    }

    #[test]
    fn test_ambiguous_width_toggle() {
        // U+00B1 (plus-minus sign) is ambiguous East-Asian width.
        assert_eq!(char_display_width('±', false), width(1u16));
        assert_eq!(char_display_width('±', true), width(2u16));
    }

    #[test_case(0, 8   ; "tab at column zero")]
    #[test_case(1, 8   ; "tab at column one")]
    #[test_case(7, 8   ; "tab just before stop")]
    #[test_case(8, 16  ; "tab exactly at stop")]
    #[test_case(12, 16 ; "tab mid field")]
    fn test_next_tab_stop(at: u16, expected: u16) {
        assert_eq!(next_tab_stop(col(at)), col(expected));
    }

    #[test]
    fn test_str_width_mixed_scripts() {
        assert_eq!(str_display_width("abc", false), width(3u16));
        assert_eq!(str_display_width("中文", false), width(4u16));
        // Combining mark attaches to the previous cluster without advancing.
        assert_eq!(str_display_width("e\u{0301}", false), width(1u16));
    }

    #[test]
    fn test_str_width_from_with_tabs() {
        // "ab<tab>c" starting at column 0: a=1, b=1, tab jumps to 8, c=1.
        assert_eq!(str_display_width_from("ab\tc", col(0u16), false), width(9u16));
        // Same text starting at column 6: tab jumps from 8 to 16.
        assert_eq!(str_display_width_from("ab\tc", col(6u16), false), width(11u16));
    }

    #[test]
    fn test_str_width_skips_ansi_escapes() {
        let painted = "\u{1b}[31mred\u{1b}[0m";
        assert_eq!(str_display_width_from(painted, col(0u16), false), width(3u16));
    }
}
