// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Editor configuration consumed by dispatch and rendering.
//!
//! Hosts mutate this through the setters on [`crate::Readline`]; the settings
//! are captured per `read_line` call, so flipping a switch between calls is
//! safe and flipping it mid-call has no effect until the next call.

use crate::ansi::sequences::AnsiColor;
use crate::completion::WordCompletionConfig;
use crate::core::line_buffer::DEFAULT_MAX_LEN;

/// All tunables in one place. [`Default`] gives the stock readline feel.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Printed after the caller-supplied prompt text on the first line.
    pub prompt_marker: String,
    /// Printed at the start of continuation lines of a multiline edit.
    pub continuation_marker: String,
    /// Trailing code point that forces Enter to insert a newline.
    pub continuation_char: char,
    /// Escape character consulted by the bracket/quote balance scanner.
    pub escape_char: char,

    pub prompt_color: AnsiColor,
    /// Interface color for auxiliary text (inline help, menu frame).
    pub info_color: AnsiColor,
    /// Interface color for de-emphasized text (search modeline context).
    pub diminish_color: AnsiColor,
    /// Interface color for emphasized text (search match highlight).
    pub emphasis_color: AnsiColor,
    /// Color for inline hints and the completion preview ghost.
    pub hint_color: AnsiColor,

    /// Multiline editing: Enter inserts a newline while input is unfinished.
    pub multiline: bool,
    /// Audible bell on errors (empty completion, failed undo).
    pub beep: bool,
    /// Force color on/off; `None` defers to detection.
    pub color_override: Option<bool>,
    /// After a unique completion applies, immediately re-invoke completion.
    pub auto_tab: bool,
    /// Ghost-render the selected completion candidate at the cursor.
    pub completion_preview: bool,
    /// One-line key hint under the prompt until the first keystroke.
    pub inline_help: bool,
    /// Indent continuation lines to align with the prompt marker.
    pub multiline_indent: bool,
    /// Treat ambiguous East-Asian width code points as wide.
    pub ambiguous_width_wide: bool,

    /// Hard cap on the edit buffer, in bytes.
    pub max_buffer_len: usize,

    /// Word boundary / quoting rules shared by the completion helpers.
    pub word_completion: WordCompletionConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            prompt_marker: "> ".into(),
            continuation_marker: "| ".into(),
            continuation_char: '\\',
            escape_char: '\\',
            prompt_color: AnsiColor::Green,
            info_color: AnsiColor::Cyan,
            diminish_color: AnsiColor::BrightBlack,
            emphasis_color: AnsiColor::Yellow,
            hint_color: AnsiColor::BrightBlack,
            multiline: true,
            beep: true,
            color_override: None,
            auto_tab: false,
            completion_preview: true,
            inline_help: false,
            multiline_indent: true,
            ambiguous_width_wide: false,
            max_buffer_len: DEFAULT_MAX_LEN,
            word_completion: WordCompletionConfig::default(),
        }
    }
}
