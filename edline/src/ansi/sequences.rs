// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Typed builders for the escape sequences the renderer emits.
//!
//! Every write to the terminal goes through [`CsiSequence`] / [`SgrCode`]
//! rather than ad-hoc format strings, so the full output vocabulary of the
//! crate is auditable in one place.
//!
//! Note on the CSI zero bug: `CSI 0 C` is interpreted as `CSI 1 C` by
//! terminals, so movement constructors with a zero count render as the empty
//! string instead of emitting a sequence.

use std::fmt::{Display, Formatter, Result};

use super::csi_codes::{BEL, CSI_START};

/// The 16 standard ANSI colors plus `Default` (SGR 39/49).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    #[default]
    Default,
}

impl AnsiColor {
    /// SGR parameter for this color as a foreground.
    #[must_use]
    pub fn fg_code(self) -> u8 {
        match self {
            AnsiColor::Black => 30,
            AnsiColor::Red => 31,
            AnsiColor::Green => 32,
            AnsiColor::Yellow => 33,
            AnsiColor::Blue => 34,
            AnsiColor::Magenta => 35,
            AnsiColor::Cyan => 36,
            AnsiColor::White => 37,
            AnsiColor::BrightBlack => 90,
            AnsiColor::BrightRed => 91,
            AnsiColor::BrightGreen => 92,
            AnsiColor::BrightYellow => 93,
            AnsiColor::BrightBlue => 94,
            AnsiColor::BrightMagenta => 95,
            AnsiColor::BrightCyan => 96,
            AnsiColor::BrightWhite => 97,
            AnsiColor::Default => 39,
        }
    }

    /// SGR parameter for this color as a background (foreground code + 10).
    #[must_use]
    pub fn bg_code(self) -> u8 { self.fg_code() + 10 }
}

/// Select Graphic Rendition codes (the `CSI n m` family).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SgrCode {
    Reset,
    Bold,
    Underline,
    Reverse,
    Foreground(AnsiColor),
    Background(AnsiColor),
}

impl Display for SgrCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let param: u8 = match self {
            SgrCode::Reset => 0,
            SgrCode::Bold => 1,
            SgrCode::Underline => 4,
            SgrCode::Reverse => 7,
            SgrCode::Foreground(color) => color.fg_code(),
            SgrCode::Background(color) => color.bg_code(),
        };
        write!(f, "{CSI_START}{param}m")
    }
}

/// Cursor movement and erase sequences.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsiSequence {
    /// `CSI n A` — up by n rows.
    CursorUp(u16),
    /// `CSI n B` — down by n rows.
    CursorDown(u16),
    /// `CSI n C` — right by n columns.
    CursorForward(u16),
    /// `CSI n D` — left by n columns.
    CursorBack(u16),
    /// `CSI n G` — to absolute column (1-based).
    CursorColumn(u16),
    /// `CSI r ; c H` — to absolute position (1-based row and column).
    CursorPosition(u16, u16),
    /// `CSI K` — erase from cursor to end of line.
    EraseToEol,
    /// `CSI 2 J` — clear the whole screen (used on Ctrl+L only).
    ClearScreen,
    /// BEL.
    Bell,
}

impl Display for CsiSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            CsiSequence::CursorUp(0)
            | CsiSequence::CursorDown(0)
            | CsiSequence::CursorForward(0)
            | CsiSequence::CursorBack(0) => Ok(()),
            CsiSequence::CursorUp(n) => write!(f, "{CSI_START}{n}A"),
            CsiSequence::CursorDown(n) => write!(f, "{CSI_START}{n}B"),
            CsiSequence::CursorForward(n) => write!(f, "{CSI_START}{n}C"),
            CsiSequence::CursorBack(n) => write!(f, "{CSI_START}{n}D"),
            CsiSequence::CursorColumn(n) => write!(f, "{CSI_START}{n}G"),
            CsiSequence::CursorPosition(row, col) => write!(f, "{CSI_START}{row};{col}H"),
            CsiSequence::EraseToEol => write!(f, "{CSI_START}K"),
            CsiSequence::ClearScreen => write!(f, "{CSI_START}2J"),
            CsiSequence::Bell => write!(f, "{BEL}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(CsiSequence::CursorUp(3), "\u{1b}[3A" ; "cursor up")]
    #[test_case(CsiSequence::CursorDown(1), "\u{1b}[1B" ; "cursor down")]
    #[test_case(CsiSequence::CursorForward(12), "\u{1b}[12C" ; "cursor forward")]
    #[test_case(CsiSequence::CursorBack(2), "\u{1b}[2D" ; "cursor back")]
    #[test_case(CsiSequence::CursorColumn(1), "\u{1b}[1G" ; "cursor column")]
    #[test_case(CsiSequence::CursorPosition(1, 1), "\u{1b}[1;1H" ; "cursor position")]
    #[test_case(CsiSequence::EraseToEol, "\u{1b}[K" ; "erase to eol")]
    #[test_case(CsiSequence::ClearScreen, "\u{1b}[2J" ; "clear screen")]
    fn test_csi_sequence_display(seq: CsiSequence, expected: &str) {
        assert_eq!(seq.to_string(), expected);
    }

    /// Regression guard for the CSI zero bug: `CSI 0 C` means `CSI 1 C` to
    /// terminals, so zero-count movement must emit nothing.
    #[test_case(CsiSequence::CursorUp(0) ; "up zero")]
    #[test_case(CsiSequence::CursorDown(0) ; "down zero")]
    #[test_case(CsiSequence::CursorForward(0) ; "forward zero")]
    #[test_case(CsiSequence::CursorBack(0) ; "back zero")]
    fn test_zero_movement_is_empty(seq: CsiSequence) {
        assert_eq!(seq.to_string(), "");
    }

    #[test]
    fn test_sgr_codes() {
        assert_eq!(SgrCode::Reset.to_string(), "\u{1b}[0m");
        assert_eq!(SgrCode::Bold.to_string(), "\u{1b}[1m");
        assert_eq!(
            SgrCode::Foreground(AnsiColor::Red).to_string(),
            "\u{1b}[31m"
        );
        assert_eq!(
            SgrCode::Background(AnsiColor::BrightCyan).to_string(),
            "\u{1b}[106m"
        );
        assert_eq!(
            SgrCode::Foreground(AnsiColor::Default).to_string(),
            "\u{1b}[39m"
        );
    }
}
