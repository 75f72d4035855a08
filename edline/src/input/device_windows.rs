// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Windows console input, delegated to crossterm.
//!
//! Crossterm reads console key records (`ReadConsoleInput`) and hands back
//! decoded key events with UTF-16 surrogate pairs already folded into
//! `char`s; this adapter maps them onto the same [`InputEvent`] shape the
//! POSIX byte parser produces, so the editor above is platform blind.

use std::io;

use crossterm::event::{Event, KeyCode as CtKeyCode, KeyEvent, KeyEventKind, KeyModifiers as
                       CtKeyModifiers, read};

use super::key_event::{InputEvent, KeyCode, KeyModifiers, KeyPress};
use crate::core::dimens::Size;

/// Blocking decoder over the Windows console. One instance per `read_line`
/// call.
#[derive(Debug, Default)]
pub struct InputDevice;

impl InputDevice {
    /// # Errors
    ///
    /// Console read failures.
    pub fn new() -> io::Result<Self> { Ok(Self) }

    /// Block until the next event. `Ok(None)` when the console stream ends.
    ///
    /// # Errors
    ///
    /// Console read failures.
    pub fn next_event(&mut self) -> io::Result<Option<InputEvent>> {
        loop {
            match read()? {
                Event::Key(key_event) => {
                    if key_event.kind == KeyEventKind::Release {
                        continue;
                    }
                    if let Some(press) = map_key_event(&key_event) {
                        return Ok(Some(InputEvent::Keyboard(press)));
                    }
                }
                Event::Resize(cols, rows) => {
                    return Ok(Some(InputEvent::Resize(Size::new(cols, rows))));
                }
                Event::Paste(payload) => {
                    // Verbatim except NUL, matching the POSIX paste capture.
                    return Ok(Some(InputEvent::Paste(payload.replace('\0', ""))));
                }
                // Focus and mouse reports carry no meaning for line editing.
                Event::FocusGained | Event::FocusLost | Event::Mouse(_) => {}
            }
        }
    }
}

fn map_key_event(key_event: &KeyEvent) -> Option<KeyPress> {
    let code = match key_event.code {
        CtKeyCode::Char(c) => KeyCode::Char(c),
        CtKeyCode::Enter => KeyCode::Enter,
        CtKeyCode::Tab => KeyCode::Tab,
        CtKeyCode::BackTab => KeyCode::BackTab,
        CtKeyCode::Backspace => KeyCode::Backspace,
        CtKeyCode::Esc => KeyCode::Esc,
        CtKeyCode::Up => KeyCode::Up,
        CtKeyCode::Down => KeyCode::Down,
        CtKeyCode::Left => KeyCode::Left,
        CtKeyCode::Right => KeyCode::Right,
        CtKeyCode::Home => KeyCode::Home,
        CtKeyCode::End => KeyCode::End,
        CtKeyCode::Insert => KeyCode::Insert,
        CtKeyCode::Delete => KeyCode::Delete,
        CtKeyCode::PageUp => KeyCode::PageUp,
        CtKeyCode::PageDown => KeyCode::PageDown,
        CtKeyCode::F(n) => KeyCode::Function(n),
        _ => return None,
    };

    let modifiers = KeyModifiers {
        shift: key_event.modifiers.contains(CtKeyModifiers::SHIFT),
        ctrl: key_event.modifiers.contains(CtKeyModifiers::CONTROL),
        alt: key_event.modifiers.contains(CtKeyModifiers::ALT),
    };

    // Normalize Ctrl+letter to lowercase so dispatch tables match the POSIX
    // decoder (control bytes always recover lowercase letters).
    let code = match code {
        KeyCode::Char(c) if modifiers.ctrl => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };

    Some(KeyPress { code, modifiers })
}
