// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The rendering pipeline: editor state in, minimal escape sequence out.
//!
//! Each frame is assembled logically first — prompt prefix, the buffer laid
//! out into visual rows against the terminal width (soft wrap, tab stops,
//! zero-width clusters), optional highlighting, the completion preview ghost,
//! and the active overlay (menu, search modeline, help) — then diffed against
//! what the previous frame occupied: move to the top of the old frame,
//! rewrite each row with an erase-to-EOL, clear leftover rows, and park the
//! cursor at its logical position. No alternate screen; a full clear happens
//! only on `Ctrl+L`.

use std::io;

use smallvec::SmallVec;

use crate::ansi::sequences::{AnsiColor, CsiSequence, SgrCode};
use crate::config::EditorConfig;
use crate::core::dimens::{ColIndex, ColWidth, Size, col, width};
use crate::core::display_width::{char_display_width, next_tab_stop, str_display_width_from};
use crate::editor::{EditorMode, LineEditor, MenuState};
use crate::history::{SearchDirection, match_offset};
use crate::input::key_event::{KeyCode, KeyPress};
use crate::terminal::output::OutputDevice;

/// Host-supplied syntax highlighting, in one of two shapes.
pub enum Highlighter {
    /// Pure function from the buffer string to the same string with ANSI
    /// escapes spliced in (visible text must be preserved).
    Transform(Box<dyn Fn(&str) -> String + Send>),
    /// Positional painter: returns byte ranges to style.
    Painter(Box<dyn Fn(&str) -> Vec<PaintSpan> + Send>),
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Highlighter::Transform(_) => write!(f, "Highlighter::Transform"),
            Highlighter::Painter(_) => write!(f, "Highlighter::Painter"),
        }
    }
}

/// One painted byte range of the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaintSpan {
    pub start: usize,
    pub end: usize,
    pub color: AnsiColor,
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
}

/// Cap on visible completion menu rows; the window slides with the selection.
const MENU_MAX_ROWS: usize = 10;

/// A logical frame, ready to diff against the previous one.
#[derive(Debug, Default)]
struct Frame {
    /// Fully rendered rows, SGR escapes embedded.
    rows: SmallVec<[String; 4]>,
    cursor_row: u16,
    cursor_col: u16,
}

/// Diff-based screen writer. Remembers how many rows the previous frame drew
/// and where the cursor was parked within them.
#[derive(Debug)]
pub struct Renderer {
    term_size: Size,
    /// Rows occupied by the previous frame; 0 = nothing on screen yet.
    last_rows: u16,
    last_cursor_row: u16,
}

impl Renderer {
    #[must_use]
    pub fn new(term_size: Size) -> Self {
        Self {
            term_size,
            last_rows: 0,
            last_cursor_row: 0,
        }
    }

    /// Resize: adopt the new geometry and forget the previous frame (row
    /// arithmetic against the old width would be wrong).
    pub fn set_size(&mut self, term_size: Size) {
        self.term_size = term_size;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.last_rows = 0;
        self.last_cursor_row = 0;
    }

    /// `Ctrl+L`: wipe the screen, then draw the next frame at the top.
    ///
    /// # Errors
    ///
    /// Terminal write failures.
    pub fn clear_screen(&mut self, out: &mut OutputDevice) -> io::Result<()> {
        out.seq(CsiSequence::ClearScreen);
        out.seq(CsiSequence::CursorPosition(1, 1));
        self.invalidate();
        out.flush()
    }

    /// Draw one frame reflecting the current editor state.
    ///
    /// # Errors
    ///
    /// Terminal write failures.
    pub fn render(
        &mut self,
        editor: &LineEditor,
        prompt: &str,
        config: &EditorConfig,
        highlighter: Option<&Highlighter>,
        out: &mut OutputDevice,
    ) -> io::Result<()> {
        let frame = build_frame(
            editor,
            prompt,
            config,
            highlighter,
            out.color_enabled(),
            self.term_size.col_width,
        );

        // Move to the top-left of the previous frame.
        out.seq(CsiSequence::CursorColumn(1));
        out.seq(CsiSequence::CursorUp(self.last_cursor_row));

        // Overwrite row by row, erasing stale tails.
        for (idx, row) in frame.rows.iter().enumerate() {
            if idx > 0 {
                out.newline();
            }
            out.text(row);
            out.seq(CsiSequence::EraseToEol);
        }

        // Blank out rows the previous frame used beyond this one.
        let new_rows = u16::try_from(frame.rows.len()).unwrap_or(u16::MAX).max(1);
        let stale_rows = self.last_rows.saturating_sub(new_rows);
        for _ in 0..stale_rows {
            out.newline();
            out.seq(CsiSequence::EraseToEol);
        }
        out.seq(CsiSequence::CursorUp(stale_rows));

        // Park the cursor at its logical position.
        out.seq(CsiSequence::CursorUp(new_rows - 1 - frame.cursor_row));
        out.seq(CsiSequence::CursorColumn(frame.cursor_col + 1));

        self.last_rows = new_rows;
        self.last_cursor_row = frame.cursor_row;
        out.flush()
    }

    /// After submission/cancel: drop below the frame and return the carriage,
    /// so host output starts on a fresh line.
    ///
    /// # Errors
    ///
    /// Terminal write failures.
    pub fn finalize(&mut self, out: &mut OutputDevice) -> io::Result<()> {
        out.seq(CsiSequence::CursorDown(
            self.last_rows.saturating_sub(1) - self.last_cursor_row.min(self.last_rows.saturating_sub(1)),
        ));
        out.newline();
        self.invalidate();
        out.flush()
    }
}

// ----------------------------------------------------------------------
// Frame assembly.
// ----------------------------------------------------------------------

/// A unit of the paint stream: a visible code point or a raw escape chunk.
enum Piece {
    Ch(char),
    Esc(String),
}

struct Layout {
    rows: SmallVec<[String; 4]>,
    current: String,
    column: ColIndex,
    term_width: ColWidth,
    cursor: Option<(u16, u16)>,
    ambiguous_wide: bool,
}

impl Layout {
    fn new(term_width: ColWidth, ambiguous_wide: bool) -> Self {
        Self {
            rows: SmallVec::new(),
            current: String::new(),
            column: col(0u16),
            term_width,
            cursor: None,
            ambiguous_wide,
        }
    }

    fn row_index(&self) -> u16 { u16::try_from(self.rows.len()).unwrap_or(u16::MAX) }

    fn mark_cursor(&mut self) {
        if self.cursor.is_none() {
            self.cursor = Some((self.row_index(), self.column.as_u16()));
        }
    }

    fn break_row(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.rows.push(finished);
        self.column = col(0u16);
    }

    fn push_prefix(&mut self, prefix: &str) {
        self.current.push_str(prefix);
        self.column = self
            .column
            .add_width(str_display_width_from(prefix, self.column, self.ambiguous_wide));
    }

    fn push_escape(&mut self, escape: &str) { self.current.push_str(escape); }

    fn push_char(&mut self, ch: char) {
        if ch == '\t' {
            let target = next_tab_stop(self.column);
            if target.as_u16() >= self.term_width.as_u16() {
                self.break_row();
                return;
            }
            while self.column < target {
                self.current.push(' ');
                self.column = self.column.add_width(width(1u16));
            }
            return;
        }

        let ch_width = char_display_width(ch, self.ambiguous_wide);
        // Soft wrap when the next cluster would overflow; zero-width marks
        // never wrap, so they stay attached to their cluster.
        if !ch_width.is_zero()
            && self.column.as_u16() + ch_width.as_u16() > self.term_width.as_u16()
        {
            self.break_row();
        }
        self.current.push(ch);
        self.column = self.column.add_width(ch_width);
    }

    fn finish(mut self) -> (SmallVec<[String; 4]>, (u16, u16)) {
        let cursor = self
            .cursor
            .unwrap_or((self.row_index(), self.column.as_u16()));
        self.rows.push(std::mem::take(&mut self.current));
        (self.rows, cursor)
    }
}

#[allow(clippy::too_many_lines)]
fn build_frame(
    editor: &LineEditor,
    prompt: &str,
    config: &EditorConfig,
    highlighter: Option<&Highlighter>,
    color_enabled: bool,
    term_width: ColWidth,
) -> Frame {
    let text = editor.buffer.as_str();
    let cursor_char_idx = text[..editor.buffer.cursor()].chars().count();

    let mut layout = Layout::new(term_width, config.ambiguous_width_wide);

    // Prompt prefix (prompt text + marker), in the prompt color.
    if color_enabled {
        layout.push_escape(&SgrCode::Foreground(config.prompt_color).to_string());
    }
    layout.push_prefix(prompt);
    if color_enabled {
        layout.push_escape(&SgrCode::Reset.to_string());
    }
    let prompt_width = layout.column;

    let continuation_prefix = continuation_prefix(config, prompt_width);

    // Buffer content, with highlighting applied.
    let pieces = paint_stream(text, highlighter, color_enabled);
    let mut chars_seen = 0usize;
    for piece in pieces {
        match piece {
            Piece::Esc(escape) => layout.push_escape(&escape),
            Piece::Ch(ch) => {
                if chars_seen == cursor_char_idx {
                    layout.mark_cursor();
                }
                chars_seen += 1;
                if ch == '\n' {
                    layout.break_row();
                    layout.push_prefix(&continuation_prefix);
                } else {
                    layout.push_char(ch);
                }
            }
        }
    }
    layout.mark_cursor();

    // Completion preview ghost: the selected candidate's continuation,
    // rendered at the cursor in the hint color (display only).
    if config.completion_preview {
        if let EditorMode::CompletionMenu(menu) = &editor.mode {
            if let Some(ghost) = preview_ghost(menu) {
                if color_enabled {
                    layout.push_escape(&SgrCode::Foreground(config.hint_color).to_string());
                }
                for ch in ghost.chars() {
                    layout.push_char(ch);
                }
                if color_enabled {
                    layout.push_escape(&SgrCode::Reset.to_string());
                }
            }
        }
    }

    let (mut rows, (cursor_row, cursor_col)) = layout.finish();

    // Overlays render below the input rows and never carry the cursor.
    match &editor.mode {
        EditorMode::CompletionMenu(menu) => {
            append_menu_rows(&mut rows, menu, config, color_enabled);
        }
        EditorMode::HistorySearch(search) => {
            rows.push(search_modeline(
                text,
                &search.pattern,
                search.direction,
                config,
                color_enabled,
            ));
        }
        EditorMode::Editing => {}
    }
    if editor.help_visible {
        append_help_rows(&mut rows, config, color_enabled);
    } else if config.inline_help
        && editor.buffer.is_empty()
        && matches!(editor.mode, EditorMode::Editing)
    {
        let mut row = String::new();
        if color_enabled {
            row.push_str(&SgrCode::Foreground(config.diminish_color).to_string());
        }
        row.push_str("  press F1 for help, Tab to complete, Ctrl+R to search");
        if color_enabled {
            row.push_str(&SgrCode::Reset.to_string());
        }
        rows.push(row);
    }

    Frame {
        rows,
        cursor_row,
        cursor_col,
    }
}

fn continuation_prefix(config: &EditorConfig, prompt_width: ColIndex) -> String {
    let marker = &config.continuation_marker;
    if !config.multiline_indent {
        return marker.clone();
    }
    let marker_width = str_display_width_from(marker, col(0u16), config.ambiguous_width_wide);
    let pad = prompt_width.as_u16().saturating_sub(marker_width.as_u16());
    let mut prefix = " ".repeat(usize::from(pad));
    prefix.push_str(marker);
    prefix
}

fn paint_stream(
    text: &str,
    highlighter: Option<&Highlighter>,
    color_enabled: bool,
) -> Vec<Piece> {
    if !color_enabled {
        return text.chars().map(Piece::Ch).collect();
    }
    match highlighter {
        None => text.chars().map(Piece::Ch).collect(),
        Some(Highlighter::Transform(transform)) => split_escapes(&transform(text)),
        Some(Highlighter::Painter(painter)) => apply_spans(text, &painter(text)),
    }
}

/// Split a transformed string into visible chars and raw escape chunks.
fn split_escapes(painted: &str) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(painted.len());
    let mut iter = painted.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' && iter.peek() == Some(&'[') {
            let mut escape = String::from(ch);
            for esc_ch in iter.by_ref() {
                escape.push(esc_ch);
                if ('\u{40}'..='\u{7e}').contains(&esc_ch) && esc_ch != '[' {
                    break;
                }
            }
            pieces.push(Piece::Esc(escape));
        } else {
            pieces.push(Piece::Ch(ch));
        }
    }
    pieces
}

/// Turn positional paint spans into an escape-annotated stream.
fn apply_spans(text: &str, spans: &[PaintSpan]) -> Vec<Piece> {
    let mut sorted: Vec<&PaintSpan> = spans.iter().collect();
    sorted.sort_by_key(|span| span.start);

    let mut pieces = Vec::with_capacity(text.len());
    let mut active_end: Option<usize> = None;
    let mut span_iter = sorted.into_iter().peekable();

    for (byte_idx, ch) in text.char_indices() {
        if active_end == Some(byte_idx) {
            pieces.push(Piece::Esc(SgrCode::Reset.to_string()));
            active_end = None;
        }
        if active_end.is_none() {
            if let Some(span) = span_iter.next_if(|span| span.start == byte_idx) {
                let mut escape = SgrCode::Foreground(span.color).to_string();
                if span.bold {
                    escape.push_str(&SgrCode::Bold.to_string());
                }
                if span.underline {
                    escape.push_str(&SgrCode::Underline.to_string());
                }
                if span.reverse {
                    escape.push_str(&SgrCode::Reverse.to_string());
                }
                pieces.push(Piece::Esc(escape));
                active_end = Some(span.end);
            }
        }
        pieces.push(Piece::Ch(ch));
    }
    if active_end.is_some() {
        pieces.push(Piece::Esc(SgrCode::Reset.to_string()));
    }
    pieces
}

/// What the selected candidate would append past the already-typed word.
fn preview_ghost(menu: &MenuState) -> Option<String> {
    let candidate = menu.set.get(menu.selected)?;
    let ghost = candidate.replacement.get(candidate.delete_before..)?;
    if ghost.is_empty() {
        return None;
    }
    Some(ghost.to_string())
}

fn append_menu_rows(
    rows: &mut SmallVec<[String; 4]>,
    menu: &MenuState,
    config: &EditorConfig,
    color_enabled: bool,
) {
    let count = menu.set.len();
    let window = MENU_MAX_ROWS.min(count);
    let first = menu
        .selected
        .saturating_sub(window - 1)
        .min(count - window);

    for idx in first..first + window {
        let Some(candidate) = menu.set.get(idx) else {
            continue;
        };
        let mut row = String::new();
        if idx == menu.selected {
            if color_enabled {
                row.push_str(&SgrCode::Reverse.to_string());
            }
            row.push_str(&candidate.display);
            if color_enabled {
                row.push_str(&SgrCode::Reset.to_string());
            }
        } else {
            if color_enabled {
                row.push_str(&SgrCode::Foreground(config.info_color).to_string());
            }
            row.push_str(&candidate.display);
            if color_enabled {
                row.push_str(&SgrCode::Reset.to_string());
            }
        }
        rows.push(row);
    }
}

fn search_modeline(
    buffer_text: &str,
    pattern: &str,
    direction: SearchDirection,
    config: &EditorConfig,
    color_enabled: bool,
) -> String {
    let label = match direction {
        SearchDirection::Reverse => "(reverse-i-search)",
        SearchDirection::Forward => "(i-search)",
    };

    let mut row = String::new();
    if !color_enabled {
        row.push_str(label);
        row.push('\'');
        row.push_str(pattern);
        row.push_str("': ");
        row.push_str(buffer_text);
        return row;
    }

    row.push_str(&SgrCode::Foreground(config.info_color).to_string());
    row.push_str(label);
    row.push('\'');
    row.push_str(pattern);
    row.push_str("': ");
    row.push_str(&SgrCode::Reset.to_string());

    // Matched substring in emphasis, the rest diminished.
    match match_offset(buffer_text, pattern) {
        Some((start, end)) => {
            row.push_str(&SgrCode::Foreground(config.diminish_color).to_string());
            row.push_str(&buffer_text[..start]);
            row.push_str(&SgrCode::Foreground(config.emphasis_color).to_string());
            row.push_str(&buffer_text[start..end]);
            row.push_str(&SgrCode::Foreground(config.diminish_color).to_string());
            row.push_str(&buffer_text[end..]);
            row.push_str(&SgrCode::Reset.to_string());
        }
        None => {
            row.push_str(&SgrCode::Foreground(config.diminish_color).to_string());
            row.push_str(buffer_text);
            row.push_str(&SgrCode::Reset.to_string());
        }
    }
    row
}

fn append_help_rows(
    rows: &mut SmallVec<[String; 4]>,
    config: &EditorConfig,
    color_enabled: bool,
) {
    let bindings: &[(KeyPress, &str)] = &[
        (KeyPress::ctrl(KeyCode::Char('r')), "search history"),
        (KeyPress::plain(KeyCode::Tab), "complete"),
        (KeyPress::ctrl(KeyCode::Char('z')), "undo"),
        (KeyPress::ctrl(KeyCode::Char('x')), "redo"),
        (KeyPress::ctrl(KeyCode::Char('w')), "kill word"),
        (KeyPress::ctrl(KeyCode::Char('y')), "yank"),
        (KeyPress::ctrl(KeyCode::Char('l')), "clear screen"),
        (KeyPress::alt(KeyCode::Enter), "insert newline"),
        (KeyPress::ctrl(KeyCode::Char('d')), "end of input (empty line)"),
    ];

    for (chord, description) in bindings {
        let mut row = String::new();
        if color_enabled {
            row.push_str(&SgrCode::Foreground(config.info_color).to_string());
        }
        row.push_str(&format!("  {chord:<12} {description}"));
        if color_enabled {
            row.push_str(&SgrCode::Reset.to_string());
        }
        rows.push(row);
    }
}
