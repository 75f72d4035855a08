// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Snapshot undo/redo with run coalescing.
//!
//! A snapshot of `(text, cursor)` is pushed *before* a mutating action,
//! except when the action continues the current run: consecutive same-kind
//! edits at the position the previous edit left behind merge into one undo
//! unit, so typing a word then pressing undo removes the whole word, not one
//! code point. Any other action seals the run. Redo mirrors undo and is
//! cleared by any fresh mutation.

use std::collections::VecDeque;

use crate::core::line_buffer::EditBuffer;

/// Default cap on stored undo units; oldest are dropped first.
pub const UNDO_MAX_DEFAULT: usize = 50;

/// Classification of a mutating action for coalescing purposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Typing a single code point at the end of the previous insertion.
    InsertRun,
    /// Backspace/Delete/kill at the position the previous delete exposed.
    DeleteRun,
    /// Everything else: paste, completion apply, history replace, transpose.
    Structural,
}

/// One restorable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub cursor: usize,
}

impl Snapshot {
    fn of(buffer: &EditBuffer) -> Self {
        Self {
            text: buffer.as_str().to_string(),
            cursor: buffer.cursor(),
        }
    }
}

#[derive(Debug)]
pub struct UndoLog {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    max_entries: usize,
    /// Kind of the open run and the site where a continuation would apply.
    open_run: Option<(EditKind, usize)>,
}

impl Default for UndoLog {
    fn default() -> Self { Self::new() }
}

impl UndoLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_entries: UNDO_MAX_DEFAULT,
            open_run: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.undo.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.undo.is_empty() }

    /// Call *before* mutating the buffer. `site` is the byte offset the edit
    /// applies at; a same-kind edit at the open run's expected site coalesces
    /// into the existing undo unit. Any record clears the redo stack.
    pub fn record(&mut self, kind: EditKind, site: usize, buffer: &EditBuffer) {
        let coalesces = kind != EditKind::Structural
            && matches!(self.open_run, Some((open_kind, expected))
                        if open_kind == kind && expected == site);

        if !coalesces {
            self.undo.push_back(Snapshot::of(buffer));
            while self.undo.len() > self.max_entries {
                self.undo.pop_front();
            }
        }

        self.redo.clear();
        self.open_run = Some((kind, site));
    }

    /// Call *after* the mutation with the site where a continuation of this
    /// run would apply (typically the new cursor position).
    pub fn commit_site(&mut self, next_site: usize) {
        if let Some((kind, _)) = self.open_run {
            self.open_run = Some((kind, next_site));
        }
    }

    /// Seal the open run (cursor motion, mode changes). The next mutation
    /// starts a fresh undo unit.
    pub fn seal(&mut self) { self.open_run = None; }

    /// Pop the most recent undo unit, stashing the current state for redo.
    pub fn undo(&mut self, current: &EditBuffer) -> Option<Snapshot> {
        let snapshot = self.undo.pop_back()?;
        self.redo.push(Snapshot::of(current));
        self.open_run = None;
        Some(snapshot)
    }

    /// Pop the most recent redo unit, stashing the current state for undo
    /// (without clearing redo).
    pub fn redo(&mut self, current: &EditBuffer) -> Option<Snapshot> {
        let snapshot = self.redo.pop()?;
        self.undo.push_back(Snapshot::of(current));
        self.open_run = None;
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer_with(text: &str) -> EditBuffer {
        let mut buffer = EditBuffer::new();
        buffer.replace(text);
        buffer
    }

    #[test]
    fn test_contiguous_typing_coalesces() {
        let mut log = UndoLog::new();
        let mut buffer = EditBuffer::new();

        for ch in ['a', 'b', 'c'] {
            let site = buffer.cursor();
            log.record(EditKind::InsertRun, site, &buffer);
            buffer.insert(site, &ch.to_string()).unwrap();
            log.commit_site(buffer.cursor());
        }

        // Three keystrokes, one undo unit.
        assert_eq!(log.len(), 1);
        let snapshot = log.undo(&buffer).unwrap();
        assert_eq!(snapshot.text, "");
        assert_eq!(snapshot.cursor, 0);
    }

    #[test]
    fn test_non_adjacent_insert_starts_new_unit() {
        let mut log = UndoLog::new();
        let mut buffer = buffer_with("abc");

        log.record(EditKind::InsertRun, 3, &buffer);
        buffer.insert(3, "d").unwrap();
        log.commit_site(buffer.cursor());

        // Cursor jumps to 0, then types: new unit.
        buffer.set_cursor(0).unwrap();
        log.record(EditKind::InsertRun, 0, &buffer);
        buffer.insert(0, "x").unwrap();
        log.commit_site(buffer.cursor());

        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_structural_never_coalesces() {
        let mut log = UndoLog::new();
        let buffer = buffer_with("abc");

        log.record(EditKind::Structural, 3, &buffer);
        log.record(EditKind::Structural, 3, &buffer);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_undo_then_redo_is_identity() {
        let mut log = UndoLog::new();
        let mut buffer = EditBuffer::new();

        log.record(EditKind::InsertRun, 0, &buffer);
        buffer.insert(0, "hello").unwrap();
        log.commit_site(buffer.cursor());

        let before = (buffer.as_str().to_string(), buffer.cursor());

        let undone = log.undo(&buffer).unwrap();
        buffer.replace(undone.text.clone());
        buffer.set_cursor(undone.cursor).unwrap();

        let redone = log.redo(&buffer).unwrap();
        buffer.replace(redone.text.clone());
        buffer.set_cursor(redone.cursor).unwrap();

        assert_eq!((buffer.as_str().to_string(), buffer.cursor()), before);
    }

    #[test]
    fn test_fresh_mutation_clears_redo() {
        let mut log = UndoLog::new();
        let mut buffer = EditBuffer::new();

        log.record(EditKind::InsertRun, 0, &buffer);
        buffer.insert(0, "a").unwrap();
        log.commit_site(buffer.cursor());

        let undone = log.undo(&buffer).unwrap();
        buffer.replace(undone.text);

        log.record(EditKind::InsertRun, 0, &buffer);
        buffer.insert(0, "b").unwrap();
        log.commit_site(buffer.cursor());

        assert_eq!(log.redo(&buffer), None);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut log = UndoLog::new();
        let mut buffer = EditBuffer::new();

        for i in 0..60 {
            // Seal between each so nothing coalesces.
            log.seal();
            log.record(EditKind::InsertRun, buffer.cursor(), &buffer);
            buffer.insert(buffer.cursor(), &i.to_string()).unwrap();
            log.commit_site(buffer.cursor());
        }

        assert_eq!(log.len(), UNDO_MAX_DEFAULT);
    }

    #[test]
    fn test_delete_run_coalesces_backspaces() {
        let mut log = UndoLog::new();
        let mut buffer = buffer_with("abcd");

        // Three backspaces from the end.
        for _ in 0..3 {
            let cursor = buffer.cursor();
            let prev = buffer.prev_offset(cursor).unwrap();
            log.record(EditKind::DeleteRun, cursor, &buffer);
            buffer.delete(prev, cursor).unwrap();
            log.commit_site(buffer.cursor());
        }

        assert_eq!(log.len(), 1);
        assert_eq!(buffer.as_str(), "a");
        let snapshot = log.undo(&buffer).unwrap();
        assert_eq!(snapshot.text, "abcd");
    }
}
