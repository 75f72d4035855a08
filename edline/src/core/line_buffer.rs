// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The edit buffer: UTF-8 bytes plus a byte-offset cursor.
//!
//! Invariants, maintained by construction:
//! - the buffer is always valid UTF-8 (mutation goes through `&str` APIs),
//! - the cursor always lies on a `char` boundary,
//! - `byte_len() <= max_len` (default [`DEFAULT_MAX_LEN`]).
//!
//! Failed operations report a [`BufferError`] and leave the buffer unchanged.

use thiserror::Error;

use super::dimens::{ColIndex, ColWidth};
use super::display_width::str_display_width_from;

/// Hard cap on buffer growth. Generous; a single interactive line never gets
/// close, but a runaway paste must not balloon memory.
pub const DEFAULT_MAX_LEN: usize = 1024 * 1024;

/// Errors from [`EditBuffer`] mutation. The buffer is unchanged when these are
/// returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("byte offset {offset} is out of range (buffer length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("byte offset {offset} is not on a char boundary")]
    NotCharBoundary { offset: usize },

    #[error("buffer capacity exceeded: {requested} bytes > max {max}")]
    CapacityExceeded { requested: usize, max: usize },
}

/// The user's current input line (possibly containing newlines when multiline
/// editing is active), plus the edit cursor as a byte offset into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
    max_len: usize,
}

impl Default for EditBuffer {
    fn default() -> Self { Self::new() }
}

impl EditBuffer {
    #[must_use]
    pub fn new() -> Self { Self::with_max_len(DEFAULT_MAX_LEN) }

    #[must_use]
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            max_len,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str { &self.text }

    #[must_use]
    pub fn byte_len(&self) -> usize { self.text.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.text.is_empty() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    /// Replace the whole buffer content (history navigation, undo restore).
    /// The cursor moves to the end.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Move the cursor to `offset`.
    ///
    /// # Errors
    ///
    /// [`BufferError::OffsetOutOfRange`] or [`BufferError::NotCharBoundary`];
    /// the cursor does not move.
    pub fn set_cursor(&mut self, offset: usize) -> Result<(), BufferError> {
        self.check_boundary(offset)?;
        self.cursor = offset;
        Ok(())
    }

    /// The code point starting at `offset`, if any.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(offset..).and_then(|tail| tail.chars().next())
    }

    /// Byte offset of the next code point boundary after `offset`.
    #[must_use]
    pub fn next_offset(&self, offset: usize) -> Option<usize> {
        let ch = self.char_at(offset)?;
        Some(offset + ch.len_utf8())
    }

    /// Byte offset of the previous code point boundary before `offset`.
    #[must_use]
    pub fn prev_offset(&self, offset: usize) -> Option<usize> {
        let head = self.text.get(..offset)?;
        let ch = head.chars().next_back()?;
        Some(offset - ch.len_utf8())
    }

    /// Insert `ins` at `offset`.
    ///
    /// # Errors
    ///
    /// Boundary errors, or [`BufferError::CapacityExceeded`] when the insert
    /// would push the buffer past its cap. No partial insertion happens.
    pub fn insert(&mut self, offset: usize, ins: &str) -> Result<(), BufferError> {
        self.check_boundary(offset)?;
        let requested = self.text.len() + ins.len();
        if requested > self.max_len {
            return Err(BufferError::CapacityExceeded {
                requested,
                max: self.max_len,
            });
        }
        self.text.insert_str(offset, ins);
        if self.cursor >= offset {
            self.cursor += ins.len();
        }
        Ok(())
    }

    /// True when `extra` more bytes fit under the cap.
    #[must_use]
    pub fn can_insert(&self, extra: usize) -> bool { self.text.len() + extra <= self.max_len }

    /// Delete the bytes in `start..end`, returning the removed text (callers
    /// feed kill operations into the kill buffer with it).
    ///
    /// # Errors
    ///
    /// Boundary errors on either end of the range; nothing is removed.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<String, BufferError> {
        self.check_boundary(start)?;
        self.check_boundary(end)?;
        if start > end {
            return Err(BufferError::OffsetOutOfRange {
                offset: start,
                len: end,
            });
        }
        let removed = self.text[start..end].to_string();
        self.text.replace_range(start..end, "");
        if self.cursor >= end {
            self.cursor -= end - start;
        } else if self.cursor > start {
            self.cursor = start;
        }
        Ok(removed)
    }

    /// Display width of the bytes in `start..end`, with tabs expanded from
    /// `start_col`.
    #[must_use]
    pub fn width_of_range(
        &self,
        start: usize,
        end: usize,
        start_col: ColIndex,
        ambiguous_wide: bool,
    ) -> ColWidth {
        match self.text.get(start..end) {
            Some(segment) => str_display_width_from(segment, start_col, ambiguous_wide),
            None => ColWidth(0),
        }
    }

    /// Start offset of the logical line containing `offset` (just past the
    /// previous `\n`, or 0).
    #[must_use]
    pub fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |idx| idx + 1)
    }

    /// End offset of the logical line containing `offset` (the next `\n`, or
    /// the buffer end).
    #[must_use]
    pub fn line_end(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |idx| offset + idx)
    }

    /// Walk left from `offset` to the start of the previous word: skip
    /// non-word code points, then take the maximal run of word code points.
    #[must_use]
    pub fn prev_word_start(&self, offset: usize, is_word_char: fn(char) -> bool) -> usize {
        let mut pos = offset;
        while let Some(prev) = self.prev_offset(pos) {
            match self.char_at(prev) {
                Some(ch) if !is_word_char(ch) => pos = prev,
                _ => break,
            }
        }
        while let Some(prev) = self.prev_offset(pos) {
            match self.char_at(prev) {
                Some(ch) if is_word_char(ch) => pos = prev,
                _ => break,
            }
        }
        pos
    }

    /// Walk right from `offset` to the end of the next word.
    #[must_use]
    pub fn next_word_end(&self, offset: usize, is_word_char: fn(char) -> bool) -> usize {
        let mut pos = offset;
        while let Some(ch) = self.char_at(pos) {
            if is_word_char(ch) {
                break;
            }
            pos += ch.len_utf8();
        }
        while let Some(ch) = self.char_at(pos) {
            if !is_word_char(ch) {
                break;
            }
            pos += ch.len_utf8();
        }
        pos
    }

    fn check_boundary(&self, offset: usize) -> Result<(), BufferError> {
        if offset > self.text.len() {
            return Err(BufferError::OffsetOutOfRange {
                offset,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(BufferError::NotCharBoundary { offset });
        }
        Ok(())
    }
}

/// Default word class: alphanumerics plus `_`.
#[must_use]
pub fn default_is_word_char(ch: char) -> bool { ch.is_alphanumeric() || ch == '_' }
