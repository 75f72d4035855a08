// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Key event types produced by the input decoder.
//!
//! Decoded events are deliberately terminal-agnostic: the POSIX byte parser
//! and the Windows console reader both surface this shape, so everything above
//! the decoder is platform independent.

use std::fmt::{Display, Formatter, Result};

use strum_macros::Display as StrumDisplay;

use crate::core::dimens::Size;

/// A named key, after escape sequence decoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, StrumDisplay)]
pub enum KeyCode {
    /// A printable code point (also carries the letter for `Ctrl`/`Alt` chords).
    #[strum(to_string = "{0}")]
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    /// Function keys `F1`..=`F12`.
    #[strum(to_string = "F{0}")]
    Function(u8),
}

/// Modifier state attached to a key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: KeyModifiers = KeyModifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
    pub const ALT: KeyModifiers = KeyModifiers {
        shift: false,
        ctrl: false,
        alt: true,
    };
    pub const SHIFT: KeyModifiers = KeyModifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };

    #[must_use]
    pub fn is_none(&self) -> bool { !(self.shift || self.ctrl || self.alt) }
}

/// One key press: code plus modifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    #[must_use]
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[must_use]
    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CTRL,
        }
    }

    #[must_use]
    pub fn alt(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::ALT,
        }
    }

    /// True for a plain `Ctrl+letter` chord (the letter is stored lowercase).
    #[must_use]
    pub fn is_ctrl_char(&self, letter: char) -> bool {
        self.modifiers.ctrl
            && !self.modifiers.alt
            && matches!(self.code, KeyCode::Char(c) if c == letter)
    }

    /// True for a plain `Alt+letter` chord.
    #[must_use]
    pub fn is_alt_char(&self, letter: char) -> bool {
        self.modifiers.alt
            && !self.modifiers.ctrl
            && matches!(self.code, KeyCode::Char(c) if c == letter)
    }
}

impl Display for KeyPress {
    /// Human readable chord name, e.g. `Ctrl+R` or `Alt+Enter`, for the help
    /// overlay.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            other => write!(f, "{other}"),
        }
    }
}

/// A decoded input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Keyboard(KeyPress),
    /// A bracketed paste payload, inserted verbatim without dispatch.
    Paste(String),
    /// The terminal was resized (SIGWINCH / console resize record).
    Resize(Size),
}
