// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The editor core: buffer + cursor + undo + mode, driven by key dispatch.
//!
//! One [`LineEditor`] exists per `read_line` call. Every decoded
//! [`InputEvent`] flows through [`LineEditor::apply_event`], which mutates
//! editor state and reports what the engine loop must do next (nothing, ring
//! the bell, clear the screen, or stop with a [`EngineSignal`]).
//!
//! The three modes are a sum type with per-variant state. `Editing` is the
//! default; `CompletionMenu` and `HistorySearch` are modal overlays with
//! their own key tables that fall back to `Editing` dispatch when a key
//! leaves the overlay.

pub mod multiline;
pub mod undo;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::completion::{Completer, CompletionSet};
use crate::config::EditorConfig;
use crate::core::dimens::col;
use crate::core::display_width::{char_display_width, next_tab_stop};
use crate::core::line_buffer::EditBuffer;
use crate::history::{History, SearchDirection};
use crate::input::key_event::{InputEvent, KeyCode, KeyPress};
use multiline::{IsCompletePredicate, ends_with_continuation, brackets_and_quotes_balanced};
use undo::{EditKind, Snapshot, UndoLog};

/// Terminal outcome of a `read_line` call, as decided by dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineSignal {
    /// Enter on finished input; the final buffer content.
    Finish(String),
    /// `Ctrl+C`: cancelled, history untouched.
    Interrupted,
    /// `Ctrl+D` on an empty buffer.
    Eof,
}

/// What the engine loop must do after one dispatched event.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub signal: Option<EngineSignal>,
    /// Ring the terminal bell (gated on the beep setting by the caller).
    pub bell: bool,
    /// `Ctrl+L`: clear the whole screen before the next frame.
    pub clear_screen: bool,
    /// A host callback panicked mid-call; raw mode may have been torn down by
    /// the panic hook and must be re-applied.
    pub raw_mode_dirty: bool,
}

/// Candidate menu overlay state.
#[derive(Debug)]
pub struct MenuState {
    pub set: CompletionSet,
    pub selected: usize,
}

/// Incremental history search overlay state.
#[derive(Debug)]
pub struct SearchState {
    pub pattern: String,
    pub direction: SearchDirection,
    pub match_index: Option<usize>,
    saved: Snapshot,
}

/// The editor mode; at most one is active.
#[derive(Debug, Default)]
pub enum EditorMode {
    #[default]
    Editing,
    CompletionMenu(MenuState),
    HistorySearch(SearchState),
}

/// Long-lived collaborators the editor borrows for the duration of one event.
pub struct EditorContext<'a> {
    pub config: &'a EditorConfig,
    pub history: &'a mut History,
    pub completer: Option<&'a mut (dyn Completer + Send + 'static)>,
    pub is_complete: Option<&'a IsCompletePredicate>,
}

impl std::fmt::Debug for EditorContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("has_completer", &self.completer.is_some())
            .field("has_is_complete", &self.is_complete.is_some())
            .finish_non_exhaustive()
    }
}

/// Per-call editing state.
#[derive(Debug)]
pub struct LineEditor {
    pub buffer: EditBuffer,
    pub mode: EditorMode,
    /// Help overlay is visible until the next key press.
    pub help_visible: bool,
    undo: UndoLog,
    kill_ring: String,
    /// Index into history while navigating with Up/Down; `None` = on draft.
    history_cursor: Option<usize>,
    ambiguous_width_wide: bool,
    is_word_char: fn(char) -> bool,
}

impl LineEditor {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            buffer: EditBuffer::with_max_len(config.max_buffer_len),
            mode: EditorMode::Editing,
            help_visible: false,
            undo: UndoLog::new(),
            kill_ring: String::new(),
            history_cursor: None,
            ambiguous_width_wide: config.ambiguous_width_wide,
            is_word_char: config.word_completion.is_word_char,
        }
    }

    /// Dispatch one event against the current mode.
    pub fn apply_event(&mut self, event: InputEvent, ctx: &mut EditorContext<'_>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        if self.help_visible {
            // Any key dismisses the overlay and is swallowed.
            self.help_visible = false;
            if matches!(event, InputEvent::Keyboard(_)) {
                return outcome;
            }
        }

        match event {
            InputEvent::Resize(_) => {
                // Geometry belongs to the renderer; nothing to edit.
            }
            InputEvent::Paste(payload) => self.on_paste(&payload, &mut outcome),
            InputEvent::Keyboard(press) => {
                match std::mem::take(&mut self.mode) {
                    EditorMode::Editing => self.on_editing_key(press, ctx, &mut outcome),
                    EditorMode::CompletionMenu(menu) => {
                        self.on_menu_key(menu, press, ctx, &mut outcome);
                    }
                    EditorMode::HistorySearch(search) => {
                        self.on_search_key(search, press, ctx, &mut outcome);
                    }
                }
            }
        }

        outcome
    }

    #[must_use]
    pub fn kill_ring(&self) -> &str { &self.kill_ring }

    // ------------------------------------------------------------------
    // Editing mode key table.
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn on_editing_key(
        &mut self,
        press: KeyPress,
        ctx: &mut EditorContext<'_>,
        outcome: &mut DispatchOutcome,
    ) {
        let mods = press.modifiers;

        // Ctrl chords first.
        if mods.ctrl && !mods.alt {
            match press.code {
                KeyCode::Char('a') => self.move_to(self.buffer.line_start(self.buffer.cursor())),
                KeyCode::Char('e') => self.move_to(self.buffer.line_end(self.buffer.cursor())),
                KeyCode::Char('b') => self.move_left(),
                KeyCode::Char('f') => self.move_right(),
                KeyCode::Char('h') => self.on_backspace(outcome),
                KeyCode::Char('u') => {
                    let cursor = self.buffer.cursor();
                    self.kill_range(self.buffer.line_start(cursor), cursor, outcome);
                }
                KeyCode::Char('k') => {
                    let cursor = self.buffer.cursor();
                    self.kill_range(cursor, self.buffer.line_end(cursor), outcome);
                }
                KeyCode::Char('w') => {
                    let cursor = self.buffer.cursor();
                    let start = self.buffer.prev_word_start(cursor, self.is_word_char);
                    self.kill_range(start, cursor, outcome);
                }
                KeyCode::Char('y') => self.on_yank(outcome),
                KeyCode::Char('t') => self.on_transpose(outcome),
                KeyCode::Char('z' | '_') => self.on_undo(outcome),
                KeyCode::Char('x') => self.on_redo(outcome),
                KeyCode::Char('r') => self.enter_search(SearchDirection::Reverse, ctx),
                KeyCode::Char('s') => self.enter_search(SearchDirection::Forward, ctx),
                KeyCode::Char('l') => outcome.clear_screen = true,
                KeyCode::Char('c') => outcome.signal = Some(EngineSignal::Interrupted),
                KeyCode::Char('d') => {
                    if self.buffer.is_empty() {
                        outcome.signal = Some(EngineSignal::Eof);
                    } else {
                        self.on_delete(outcome);
                    }
                }
                KeyCode::Left => self.move_word_left(),
                KeyCode::Right => self.move_word_right(),
                KeyCode::Home => self.move_to(0),
                KeyCode::End => self.move_to(self.buffer.byte_len()),
                KeyCode::Enter => self.insert_text("\n", EditKind::Structural, outcome),
                _ => {}
            }
            return;
        }

        // Alt chords.
        if mods.alt && !mods.ctrl {
            match press.code {
                KeyCode::Char('b') => self.move_word_left(),
                KeyCode::Char('f') => self.move_word_right(),
                KeyCode::Char('d') => {
                    let cursor = self.buffer.cursor();
                    let end = self.buffer.next_word_end(cursor, self.is_word_char);
                    self.kill_range(cursor, end, outcome);
                }
                KeyCode::Backspace => {
                    let cursor = self.buffer.cursor();
                    let start = self.buffer.prev_word_start(cursor, self.is_word_char);
                    self.kill_range(start, cursor, outcome);
                }
                KeyCode::Enter => self.insert_text("\n", EditKind::Structural, outcome),
                _ => {}
            }
            return;
        }

        if mods.ctrl && mods.alt {
            return;
        }

        match press.code {
            KeyCode::Char(c) => {
                let mut encoded = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut encoded), EditKind::InsertRun, outcome);
            }
            KeyCode::Enter if mods.shift => self.insert_text("\n", EditKind::Structural, outcome),
            KeyCode::Enter => self.on_enter(ctx, outcome),
            KeyCode::Backspace => self.on_backspace(outcome),
            KeyCode::Delete => self.on_delete(outcome),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_to(self.buffer.line_start(self.buffer.cursor())),
            KeyCode::End => self.move_to(self.buffer.line_end(self.buffer.cursor())),
            KeyCode::Up => self.on_up(ctx, outcome),
            KeyCode::Down => self.on_down(ctx, outcome),
            KeyCode::Tab => self.enter_completion(ctx, outcome),
            KeyCode::Function(1) => self.help_visible = true,
            KeyCode::Esc => self.undo.seal(),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Completion menu mode key table.
    // ------------------------------------------------------------------

    fn on_menu_key(
        &mut self,
        mut menu: MenuState,
        press: KeyPress,
        ctx: &mut EditorContext<'_>,
        outcome: &mut DispatchOutcome,
    ) {
        let count = menu.set.len();
        let mods = press.modifiers;

        match press.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Down if mods.is_none() => {
                menu.selected = (menu.selected + 1) % count;
                self.mode = EditorMode::CompletionMenu(menu);
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Up if !mods.ctrl && !mods.alt => {
                menu.selected = (menu.selected + count - 1) % count;
                self.mode = EditorMode::CompletionMenu(menu);
            }
            KeyCode::Enter if mods.is_none() => {
                self.apply_candidate(&menu.set, menu.selected);
            }
            KeyCode::Esc => {}
            KeyCode::Char('c' | 'g') if mods.ctrl => {}
            KeyCode::Backspace if mods.is_none() => {
                self.on_backspace(outcome);
            }
            KeyCode::Char(c) if !mods.ctrl && !mods.alt => {
                let mut encoded = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut encoded), EditKind::InsertRun, outcome);
            }
            _ => {
                // Anything else closes the menu and dispatches as an edit.
                self.on_editing_key(press, ctx, outcome);
            }
        }
    }

    // ------------------------------------------------------------------
    // History search mode key table.
    // ------------------------------------------------------------------

    fn on_search_key(
        &mut self,
        mut search: SearchState,
        press: KeyPress,
        ctx: &mut EditorContext<'_>,
        outcome: &mut DispatchOutcome,
    ) {
        let mods = press.modifiers;

        if press.is_ctrl_char('r') {
            search.direction = SearchDirection::Reverse;
            self.search_step(&mut search, ctx, true, outcome);
            self.mode = EditorMode::HistorySearch(search);
            return;
        }
        if press.is_ctrl_char('s') {
            search.direction = SearchDirection::Forward;
            self.search_step(&mut search, ctx, true, outcome);
            self.mode = EditorMode::HistorySearch(search);
            return;
        }
        if press.is_ctrl_char('g') || press.is_ctrl_char('c') {
            // Discard the match, restore what the user was typing.
            self.restore_snapshot(&search.saved);
            return;
        }

        match press.code {
            KeyCode::Enter if mods.is_none() => {
                // Accept the match as the submission.
                outcome.signal = Some(EngineSignal::Finish(self.buffer.as_str().to_string()));
            }
            KeyCode::Esc => {
                // Keep the match in the buffer, back to plain editing.
            }
            KeyCode::Backspace if mods.is_none() => {
                search.pattern.pop();
                search.match_index = None;
                if search.pattern.is_empty() {
                    self.restore_snapshot(&search.saved);
                } else {
                    self.search_step(&mut search, ctx, false, outcome);
                }
                self.mode = EditorMode::HistorySearch(search);
            }
            KeyCode::Char(c) if mods.is_none() || (mods.shift && !mods.ctrl && !mods.alt) => {
                search.pattern.push(c);
                self.search_step(&mut search, ctx, false, outcome);
                self.mode = EditorMode::HistorySearch(search);
            }
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::Up
            | KeyCode::Down => {
                // Accept the match, return to editing, re-dispatch the motion.
                self.on_editing_key(press, ctx, outcome);
            }
            _ => {
                self.mode = EditorMode::HistorySearch(search);
            }
        }
    }

    fn enter_search(&mut self, direction: SearchDirection, _ctx: &mut EditorContext<'_>) {
        self.undo.seal();
        self.mode = EditorMode::HistorySearch(SearchState {
            pattern: String::new(),
            direction,
            match_index: None,
            saved: Snapshot {
                text: self.buffer.as_str().to_string(),
                cursor: self.buffer.cursor(),
            },
        });
    }

    /// Run one search: `step` walks past the current match (`Ctrl+R` again),
    /// otherwise the pattern changed and the current position is retried.
    fn search_step(
        &mut self,
        search: &mut SearchState,
        ctx: &mut EditorContext<'_>,
        step: bool,
        outcome: &mut DispatchOutcome,
    ) {
        if search.pattern.is_empty() || ctx.history.is_empty() {
            return;
        }
        let newest = ctx.history.len() - 1;

        let from = match (search.match_index, step, search.direction) {
            (Some(current), true, SearchDirection::Reverse) => match current.checked_sub(1) {
                Some(from) => from,
                None => {
                    outcome.bell = true;
                    return;
                }
            },
            (Some(current), true, SearchDirection::Forward) => {
                if current + 1 > newest {
                    outcome.bell = true;
                    return;
                }
                current + 1
            }
            (Some(current), false, _) => current,
            (None, _, SearchDirection::Reverse) => newest,
            (None, _, SearchDirection::Forward) => 0,
        };

        match ctx.history.search(&search.pattern, from, search.direction) {
            Some(found) => {
                search.match_index = Some(found);
                if let Some(entry) = ctx.history.get(found) {
                    let entry = entry.to_string();
                    self.undo.record(EditKind::Structural, self.buffer.cursor(), &self.buffer);
                    self.buffer.replace(entry);
                }
            }
            None => outcome.bell = true,
        }
    }

    // ------------------------------------------------------------------
    // Completion.
    // ------------------------------------------------------------------

    fn enter_completion(&mut self, ctx: &mut EditorContext<'_>, outcome: &mut DispatchOutcome) {
        // auto-tab chains unique completions; bounded so a pathological
        // completer cannot spin forever.
        for _round in 0..16 {
            let Some(completer) = ctx.completer.as_deref_mut() else {
                outcome.bell = true;
                return;
            };

            let prefix = self.buffer.as_str()[..self.buffer.cursor()].to_string();
            let mut set = CompletionSet::new();

            let call = catch_unwind(AssertUnwindSafe(|| completer.complete(&prefix, &mut set)));
            if call.is_err() {
                // Host callback panicked: keep whatever candidates were added
                // before the panic and keep editing.
                tracing::debug!("completer panicked; continuing with partial candidate set");
                outcome.raw_mode_dirty = true;
            }

            match set.len() {
                0 => {
                    outcome.bell = true;
                    return;
                }
                1 => {
                    let before = self.buffer.as_str().to_string();
                    self.apply_candidate(&set, 0);
                    let unchanged = self.buffer.as_str() == before;
                    if !ctx.config.auto_tab || unchanged {
                        return;
                    }
                }
                _ => {
                    self.mode = EditorMode::CompletionMenu(MenuState { set, selected: 0 });
                    return;
                }
            }
        }
    }

    fn apply_candidate(&mut self, set: &CompletionSet, index: usize) {
        let Some(candidate) = set.get(index) else {
            return;
        };
        let replacement = set.quoted_replacement(candidate);
        let cursor = self.buffer.cursor();
        let start = cursor.saturating_sub(candidate.delete_before);

        self.undo.record(EditKind::Structural, cursor, &self.buffer);
        if self.buffer.delete(start, cursor).is_err() {
            return;
        }
        if let Err(err) = self.buffer.insert(start, &replacement) {
            tracing::debug!(?err, "completion replacement rejected");
        }
    }

    // ------------------------------------------------------------------
    // Editing primitives.
    // ------------------------------------------------------------------

    fn insert_text(&mut self, text: &str, kind: EditKind, outcome: &mut DispatchOutcome) {
        let site = self.buffer.cursor();
        if !self.buffer.can_insert(text.len()) {
            outcome.bell = true;
            return;
        }
        self.undo.record(kind, site, &self.buffer);
        match self.buffer.insert(site, text) {
            Ok(()) => self.undo.commit_site(self.buffer.cursor()),
            Err(err) => {
                tracing::debug!(?err, "insert rejected");
                outcome.bell = true;
            }
        }
    }

    fn on_paste(&mut self, payload: &str, outcome: &mut DispatchOutcome) {
        if payload.is_empty() {
            return;
        }
        self.insert_text(payload, EditKind::Structural, outcome);
    }

    fn on_enter(&mut self, ctx: &mut EditorContext<'_>, outcome: &mut DispatchOutcome) {
        if ctx.config.multiline {
            let text = self.buffer.as_str();
            if ends_with_continuation(text, ctx.config.continuation_char) {
                self.insert_text("\n", EditKind::Structural, outcome);
                return;
            }
            let complete = match ctx.is_complete {
                Some(predicate) => predicate(text),
                None => brackets_and_quotes_balanced(text, ctx.config.escape_char),
            };
            if !complete {
                self.insert_text("\n", EditKind::Structural, outcome);
                return;
            }
        }
        outcome.signal = Some(EngineSignal::Finish(self.buffer.as_str().to_string()));
    }

    fn on_backspace(&mut self, _outcome: &mut DispatchOutcome) {
        let cursor = self.buffer.cursor();
        let Some(prev) = self.buffer.prev_offset(cursor) else {
            return;
        };
        self.undo.record(EditKind::DeleteRun, cursor, &self.buffer);
        if self.buffer.delete(prev, cursor).is_ok() {
            self.undo.commit_site(self.buffer.cursor());
        }
    }

    fn on_delete(&mut self, _outcome: &mut DispatchOutcome) {
        let cursor = self.buffer.cursor();
        let Some(next) = self.buffer.next_offset(cursor) else {
            return;
        };
        self.undo.record(EditKind::DeleteRun, cursor, &self.buffer);
        if self.buffer.delete(cursor, next).is_ok() {
            self.undo.commit_site(self.buffer.cursor());
        }
    }

    fn kill_range(&mut self, start: usize, end: usize, outcome: &mut DispatchOutcome) {
        if start >= end {
            outcome.bell = true;
            return;
        }
        self.undo.record(EditKind::DeleteRun, self.buffer.cursor(), &self.buffer);
        if let Ok(removed) = self.buffer.delete(start, end) {
            self.kill_ring = removed;
            self.undo.commit_site(self.buffer.cursor());
        }
    }

    fn on_yank(&mut self, outcome: &mut DispatchOutcome) {
        if self.kill_ring.is_empty() {
            outcome.bell = true;
            return;
        }
        let text = self.kill_ring.clone();
        self.insert_text(&text, EditKind::Structural, outcome);
    }

    fn on_transpose(&mut self, outcome: &mut DispatchOutcome) {
        let cursor = self.buffer.cursor();
        let len = self.buffer.byte_len();

        let pair = if cursor >= len {
            // At the end: transpose the last two code points.
            self.buffer
                .prev_offset(len)
                .and_then(|mid| self.buffer.prev_offset(mid).map(|left| (left, mid)))
        } else {
            self.buffer.prev_offset(cursor).map(|left| (left, cursor))
        };

        let Some((left, mid)) = pair else {
            outcome.bell = true;
            return;
        };
        let Some(end) = self.buffer.next_offset(mid) else {
            outcome.bell = true;
            return;
        };

        let swapped = format!(
            "{}{}",
            &self.buffer.as_str()[mid..end],
            &self.buffer.as_str()[left..mid]
        );

        self.undo.record(EditKind::Structural, cursor, &self.buffer);
        if self.buffer.delete(left, end).is_ok() && self.buffer.insert(left, &swapped).is_ok() {
            // Cursor lands after the swapped pair via the insert adjustment.
        }
    }

    fn on_undo(&mut self, outcome: &mut DispatchOutcome) {
        match self.undo.undo(&self.buffer) {
            Some(snapshot) => self.restore_snapshot(&snapshot),
            None => outcome.bell = true,
        }
    }

    fn on_redo(&mut self, outcome: &mut DispatchOutcome) {
        match self.undo.redo(&self.buffer) {
            Some(snapshot) => self.restore_snapshot(&snapshot),
            None => outcome.bell = true,
        }
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        self.buffer.replace(snapshot.text.clone());
        // Snapshot cursors are boundaries of their own text; if this ever
        // fails the end-of-buffer position left by replace() stands.
        let _unused = self.buffer.set_cursor(snapshot.cursor);
    }

    // ------------------------------------------------------------------
    // Cursor motion.
    // ------------------------------------------------------------------

    fn move_to(&mut self, offset: usize) {
        if self.buffer.set_cursor(offset).is_ok() {
            self.undo.seal();
        }
    }

    fn move_left(&mut self) {
        if let Some(prev) = self.buffer.prev_offset(self.buffer.cursor()) {
            self.move_to(prev);
        }
    }

    fn move_right(&mut self) {
        if let Some(next) = self.buffer.next_offset(self.buffer.cursor()) {
            self.move_to(next);
        }
    }

    fn move_word_left(&mut self) {
        let target = self
            .buffer
            .prev_word_start(self.buffer.cursor(), self.is_word_char);
        self.move_to(target);
    }

    fn move_word_right(&mut self) {
        let target = self
            .buffer
            .next_word_end(self.buffer.cursor(), self.is_word_char);
        self.move_to(target);
    }

    fn on_up(&mut self, ctx: &mut EditorContext<'_>, outcome: &mut DispatchOutcome) {
        if self.buffer.line_start(self.buffer.cursor()) == 0 {
            self.history_previous(ctx, outcome);
        } else {
            self.move_vertical(true);
        }
    }

    fn on_down(&mut self, ctx: &mut EditorContext<'_>, outcome: &mut DispatchOutcome) {
        if self.buffer.line_end(self.buffer.cursor()) >= self.buffer.byte_len() {
            self.history_next(ctx, outcome);
        } else {
            self.move_vertical(false);
        }
    }

    /// Move to the same display column on the previous/next logical line.
    fn move_vertical(&mut self, up: bool) {
        let cursor = self.buffer.cursor();
        let line_start = self.buffer.line_start(cursor);
        let target_column =
            self.buffer
                .width_of_range(line_start, cursor, col(0u16), self.ambiguous_width_wide);

        let target_line_start = if up {
            match line_start.checked_sub(1) {
                Some(before_newline) => self.buffer.line_start(before_newline),
                None => return,
            }
        } else {
            let line_end = self.buffer.line_end(cursor);
            if line_end >= self.buffer.byte_len() {
                return;
            }
            line_end + 1
        };

        let target_line_end = self.buffer.line_end(target_line_start);
        let mut pos = target_line_start;
        let mut column = col(0u16);
        while pos < target_line_end {
            let Some(ch) = self.buffer.char_at(pos) else {
                break;
            };
            let next_column = if ch == '\t' {
                next_tab_stop(column)
            } else {
                column.add_width(char_display_width(ch, self.ambiguous_width_wide))
            };
            if next_column.as_u16() > target_column.as_u16() {
                break;
            }
            column = next_column;
            pos += ch.len_utf8();
        }
        self.move_to(pos);
    }

    // ------------------------------------------------------------------
    // History navigation.
    // ------------------------------------------------------------------

    fn history_previous(&mut self, ctx: &mut EditorContext<'_>, outcome: &mut DispatchOutcome) {
        if ctx.history.is_empty() {
            outcome.bell = true;
            return;
        }
        let target = match self.history_cursor {
            None => {
                // First step back: stash the in-progress line.
                ctx.history.save_draft(self.buffer.as_str());
                ctx.history.len() - 1
            }
            Some(0) => {
                outcome.bell = true;
                return;
            }
            Some(current) => current - 1,
        };
        self.replace_from_history(ctx, target);
    }

    fn history_next(&mut self, ctx: &mut EditorContext<'_>, outcome: &mut DispatchOutcome) {
        match self.history_cursor {
            None => outcome.bell = true,
            Some(current) if current + 1 < ctx.history.len() => {
                self.replace_from_history(ctx, current + 1);
            }
            Some(_) => {
                // Stepping past the newest entry restores the draft.
                let draft = ctx.history.take_draft().unwrap_or_default();
                self.undo
                    .record(EditKind::Structural, self.buffer.cursor(), &self.buffer);
                self.buffer.replace(draft);
                self.history_cursor = None;
            }
        }
    }

    fn replace_from_history(&mut self, ctx: &mut EditorContext<'_>, index: usize) {
        if let Some(entry) = ctx.history.get(index) {
            let entry = entry.to_string();
            self.undo
                .record(EditKind::Structural, self.buffer.cursor(), &self.buffer);
            self.buffer.replace(entry);
            self.history_cursor = Some(index);
        }
    }
}
