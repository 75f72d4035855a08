// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The public entry point: [`Readline`] and [`Readline::read_line`].
//!
//! A [`Readline`] value owns everything that outlives a single prompt: the
//! configuration, the history store, and the registered host callbacks
//! (completer, highlighter, is-complete predicate). Each `read_line` call
//! builds a fresh [`LineEditor`] + [`Renderer`], acquires raw mode for the
//! duration of the call, and runs the dispatch loop until the editor signals
//! completion.
//!
//! Error policy: everything inside the engine recovers locally so the
//! terminal never stays in raw mode; the caller only ever sees the tri-state
//! [`ReadlineEvent`]. I/O failures mid-edit are logged via `tracing` and
//! surface as [`ReadlineEvent::Eof`].

use std::io;
use std::path::Path;

use miette::IntoDiagnostic as _;

use crate::ansi::detect_color::{ColorSupport, global_color_support};
use crate::ansi::sequences::AnsiColor;
use crate::completion::{Completer, WordCompletionConfig};
use crate::config::EditorConfig;
use crate::editor::multiline::IsCompletePredicate;
use crate::editor::{EditorContext, EngineSignal, LineEditor};
use crate::history::History;
use crate::input::key_event::InputEvent;
use crate::input::InputDevice;
use crate::render::{Highlighter, Renderer};
use crate::terminal::output::OutputDevice;
use crate::terminal::raw_mode::RawModeGuard;
use crate::terminal::size::get_terminal_size;

/// What a `read_line` call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadlineEvent {
    /// The user submitted a line (possibly containing newlines when
    /// multiline editing is on).
    Line(String),
    /// `Ctrl+D` on an empty buffer, or the input stream went away.
    Eof,
    /// `Ctrl+C`.
    Interrupted,
}

/// Line editor façade. Create one per process (or REPL) and call
/// [`Self::read_line`] repeatedly; history and callbacks persist across
/// calls.
#[derive(Default)]
pub struct Readline {
    config: EditorConfig,
    history: History,
    completer: Option<Box<dyn Completer + Send>>,
    highlighter: Option<Highlighter>,
    is_complete: Option<Box<IsCompletePredicate>>,
}

impl std::fmt::Debug for Readline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Readline")
            .field("config", &self.config)
            .field("history_len", &self.history.len())
            .field("has_completer", &self.completer.is_some())
            .field("highlighter", &self.highlighter)
            .finish_non_exhaustive()
    }
}

impl Readline {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    // ------------------------------------------------------------------
    // Configuration setters (idempotent; take effect on the next call).
    // ------------------------------------------------------------------

    pub fn set_prompt_marker(&mut self, marker: impl Into<String>) {
        self.config.prompt_marker = marker.into();
    }

    pub fn set_continuation_marker(&mut self, marker: impl Into<String>) {
        self.config.continuation_marker = marker.into();
    }

    pub fn set_continuation_char(&mut self, ch: char) { self.config.continuation_char = ch; }

    pub fn set_prompt_color(&mut self, color: AnsiColor) { self.config.prompt_color = color; }

    pub fn set_info_color(&mut self, color: AnsiColor) { self.config.info_color = color; }

    pub fn set_diminish_color(&mut self, color: AnsiColor) { self.config.diminish_color = color; }

    pub fn set_emphasis_color(&mut self, color: AnsiColor) { self.config.emphasis_color = color; }

    pub fn set_hint_color(&mut self, color: AnsiColor) { self.config.hint_color = color; }

    pub fn enable_multiline(&mut self, enable: bool) { self.config.multiline = enable; }

    pub fn enable_beep(&mut self, enable: bool) { self.config.beep = enable; }

    /// Force color on/off; `None` restores auto-detection.
    pub fn enable_color(&mut self, force: Option<bool>) { self.config.color_override = force; }

    pub fn enable_auto_tab(&mut self, enable: bool) { self.config.auto_tab = enable; }

    pub fn enable_completion_preview(&mut self, enable: bool) {
        self.config.completion_preview = enable;
    }

    pub fn enable_inline_help(&mut self, enable: bool) { self.config.inline_help = enable; }

    pub fn enable_multiline_indent(&mut self, enable: bool) {
        self.config.multiline_indent = enable;
    }

    pub fn enable_history_duplicates(&mut self, enable: bool) {
        self.history.set_allow_duplicates(enable);
    }

    /// Treat ambiguous East-Asian width code points as wide (terminal
    /// dependent; default narrow).
    pub fn set_ambiguous_width_wide(&mut self, wide: bool) {
        self.config.ambiguous_width_wide = wide;
    }

    pub fn set_max_buffer_len(&mut self, max_len: usize) { self.config.max_buffer_len = max_len; }

    /// Word boundary / quoting rules used by the completion helpers and word
    /// motion.
    pub fn set_word_completion(&mut self, word_completion: WordCompletionConfig) {
        self.config.word_completion = word_completion;
    }

    // ------------------------------------------------------------------
    // History.
    // ------------------------------------------------------------------

    pub fn history_add(&mut self, line: impl Into<String>) { self.history.add(line); }

    pub fn history_remove_last(&mut self) -> Option<String> { self.history.remove_last() }

    pub fn history_clear(&mut self) { self.history.clear(); }

    #[must_use]
    pub fn history_len(&self) -> usize { self.history.len() }

    /// Load history from `path`, keeping the last `max_entries` lines.
    ///
    /// # Errors
    ///
    /// File read failures (also logged; the interactive engine itself never
    /// fails on history file errors).
    pub fn history_load(&mut self, path: &Path, max_entries: usize) -> miette::Result<()> {
        self.history
            .load_from_file(path, max_entries)
            .inspect_err(|err| tracing::debug!(?err, ?path, "history load failed"))
            .into_diagnostic()
    }

    /// Save history to `path` atomically (mode 0600 on POSIX).
    ///
    /// # Errors
    ///
    /// File write failures (also logged).
    pub fn history_save(&self, path: &Path) -> miette::Result<()> {
        self.history
            .save_to_file(path)
            .inspect_err(|err| tracing::debug!(?err, ?path, "history save failed"))
            .into_diagnostic()
    }

    // ------------------------------------------------------------------
    // Callbacks.
    // ------------------------------------------------------------------

    /// Register the default completer invoked by Tab.
    pub fn set_completer(&mut self, completer: impl Completer + Send + 'static) {
        self.completer = Some(Box::new(completer));
    }

    /// Register a highlighter (either shape; see [`Highlighter`]).
    pub fn set_highlighter(&mut self, highlighter: Highlighter) {
        self.highlighter = Some(highlighter);
    }

    /// Override the built-in bracket/quote "is input complete" detector.
    pub fn set_is_complete(&mut self, predicate: impl Fn(&str) -> bool + Send + 'static) {
        self.is_complete = Some(Box::new(predicate));
    }

    // ------------------------------------------------------------------
    // The engine.
    // ------------------------------------------------------------------

    /// Run the interactive editor and return the submission tri-state.
    ///
    /// Raw mode is scoped to this call and restored on every exit path;
    /// terminal I/O errors are logged and reported as [`ReadlineEvent::Eof`].
    pub fn read_line(&mut self, prompt: &str) -> ReadlineEvent {
        match self.read_line_inner(prompt) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(?err, "read_line aborted on I/O error");
                ReadlineEvent::Eof
            }
        }
    }

    fn read_line_inner(&mut self, prompt: &str) -> io::Result<ReadlineEvent> {
        let guard = RawModeGuard::enter().map_err(|err| io::Error::other(err.to_string()))?;

        let color_enabled = match self.config.color_override {
            Some(forced) => forced,
            None => global_color_support::detect() == ColorSupport::Ansi16,
        };
        let dumb_terminal = std::env::var("TERM").is_ok_and(|term| term == "dumb");

        let mut out = OutputDevice::new_stdout(color_enabled);
        if !dumb_terminal {
            out.enable_bracketed_paste();
        }

        let mut renderer = Renderer::new(get_terminal_size());
        let mut input = InputDevice::new()?;

        let event = self.run_loop(prompt, &mut out, &mut renderer, || input.next_event());

        // Teardown happens regardless of how the loop ended.
        if !dumb_terminal {
            out.disable_bracketed_paste();
        }
        let flushed = out.flush();
        drop(input);
        guard.restore().map_err(|err| io::Error::other(err.to_string()))?;
        flushed?;

        event
    }

    /// The dispatch loop, generic over the event source so tests can drive
    /// it with a scripted stream and a capture buffer.
    fn run_loop(
        &mut self,
        prompt: &str,
        out: &mut OutputDevice,
        renderer: &mut Renderer,
        mut next_event: impl FnMut() -> io::Result<Option<InputEvent>>,
    ) -> io::Result<ReadlineEvent> {
        let full_prompt = format!("{prompt}{}", self.config.prompt_marker);
        let mut editor = LineEditor::new(&self.config);

        renderer.render(
            &editor,
            &full_prompt,
            &self.config,
            self.highlighter.as_ref(),
            out,
        )?;

        loop {
            let Some(event) = next_event()? else {
                renderer.finalize(out)?;
                return Ok(ReadlineEvent::Eof);
            };

            if let InputEvent::Resize(size) = &event {
                renderer.set_size(*size);
            }

            let outcome = {
                let mut ctx = EditorContext {
                    config: &self.config,
                    history: &mut self.history,
                    completer: self.completer.as_deref_mut(),
                    is_complete: self.is_complete.as_deref(),
                };
                editor.apply_event(event, &mut ctx)
            };

            if outcome.raw_mode_dirty {
                // A host callback panicked; the panic hook may have dropped
                // raw mode, so re-apply it before drawing anything.
                if let Err(err) = crate::terminal::raw_mode::reapply() {
                    tracing::debug!(?err, "failed to re-apply raw mode");
                }
            }
            if outcome.bell && self.config.beep {
                out.bell();
            }
            if outcome.clear_screen {
                renderer.clear_screen(out)?;
            }

            match outcome.signal {
                Some(EngineSignal::Finish(line)) => {
                    renderer.render(
                        &editor,
                        &full_prompt,
                        &self.config,
                        self.highlighter.as_ref(),
                        out,
                    )?;
                    renderer.finalize(out)?;
                    self.history.add(line.clone());
                    return Ok(ReadlineEvent::Line(line));
                }
                Some(EngineSignal::Interrupted) => {
                    renderer.finalize(out)?;
                    return Ok(ReadlineEvent::Interrupted);
                }
                Some(EngineSignal::Eof) => {
                    renderer.finalize(out)?;
                    return Ok(ReadlineEvent::Eof);
                }
                None => {
                    renderer.render(
                        &editor,
                        &full_prompt,
                        &self.config,
                        self.highlighter.as_ref(),
                        out,
                    )?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimens::Size;
    use crate::input::key_event::{KeyCode, KeyPress};
    use crate::test_fixtures::StdoutMock;
    use pretty_assertions::assert_eq;

    /// Drive the engine loop with a scripted event stream and capture the
    /// terminal output.
    fn drive(readline: &mut Readline, events: Vec<InputEvent>) -> (ReadlineEvent, StdoutMock) {
        let mock = StdoutMock::default();
        let mut out = OutputDevice::new(Box::new(mock.clone()), false);
        let mut renderer = Renderer::new(Size::new(80_u16, 24_u16));
        let mut stream = events.into_iter();
        let event = readline
            .run_loop("", &mut out, &mut renderer, || Ok(stream.next()))
            .unwrap();
        (event, mock)
    }

    fn keys(text: &str) -> Vec<InputEvent> {
        text.chars()
            .map(|ch| InputEvent::Keyboard(KeyPress::plain(KeyCode::Char(ch))))
            .collect()
    }

    fn key(code: KeyCode) -> InputEvent { InputEvent::Keyboard(KeyPress::plain(code)) }

    fn ctrl(letter: char) -> InputEvent {
        InputEvent::Keyboard(KeyPress::ctrl(KeyCode::Char(letter)))
    }

    #[test]
    fn test_simple_line_submission_updates_history() {
        let mut readline = Readline::new();
        let mut events = keys("hello");
        events.push(key(KeyCode::Enter));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line("hello".into()));
        assert_eq!(readline.history_len(), 1);
    }

    #[test]
    fn test_empty_submission_not_added_to_history() {
        // foo, Ctrl+A, Ctrl+K, Enter -> "" and history unchanged.
        let mut readline = Readline::new();
        let mut events = keys("foo");
        events.push(ctrl('a'));
        events.push(ctrl('k'));
        events.push(key(KeyCode::Enter));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line(String::new()));
        assert_eq!(readline.history_len(), 0);
    }

    #[test]
    fn test_interrupt_leaves_history_untouched() {
        let mut readline = Readline::new();
        let mut events = keys("partial");
        events.push(ctrl('c'));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Interrupted);
        assert_eq!(readline.history_len(), 0);
    }

    #[test]
    fn test_eof_on_empty_buffer() {
        let mut readline = Readline::new();
        let (event, _mock) = drive(&mut readline, vec![ctrl('d')]);
        assert_eq!(event, ReadlineEvent::Eof);
    }

    #[test]
    fn test_exhausted_stream_is_eof() {
        let mut readline = Readline::new();
        let (event, _mock) = drive(&mut readline, vec![]);
        assert_eq!(event, ReadlineEvent::Eof);
    }

    #[test]
    fn test_reverse_search_submission() {
        // History [alpha, beta, beta-2]; Ctrl+R b e Enter -> "beta-2".
        let mut readline = Readline::new();
        readline.history_add("alpha");
        readline.history_add("beta");
        readline.history_add("beta-2");

        let mut events = vec![ctrl('r')];
        events.extend(keys("be"));
        events.push(key(KeyCode::Enter));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line("beta-2".into()));
    }

    #[test]
    fn test_completion_submission() {
        // Completer offers print/println for "pr": p r Tab Tab Enter Enter.
        let mut readline = Readline::new();
        readline.set_completer(|prefix: &str, set: &mut crate::completion::CompletionSet| {
            crate::completion::complete_word(
                set,
                prefix,
                &WordCompletionConfig::default(),
                ["print", "println"],
            );
        });

        let mut events = keys("pr");
        events.push(key(KeyCode::Tab));
        events.push(key(KeyCode::Tab));
        events.push(key(KeyCode::Enter));
        events.push(key(KeyCode::Enter));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line("println".into()));
    }

    #[test]
    fn test_continuation_char_joins_lines() {
        // a \ Enter b Enter -> one submission "a\<newline>b".
        let mut readline = Readline::new();
        let mut events = keys("a\\");
        events.push(key(KeyCode::Enter));
        events.extend(keys("b"));
        events.push(key(KeyCode::Enter));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line("a\\\nb".into()));
    }

    #[test]
    fn test_bracketed_paste_inserts_payload_verbatim() {
        let mut readline = Readline::new();
        let events = vec![
            InputEvent::Paste("line1\nline2".into()),
            key(KeyCode::Enter),
        ];
        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line("line1\nline2".into()));
    }

    #[test]
    fn test_prompt_marker_is_rendered() {
        let mut readline = Readline::new();
        readline.set_prompt_marker("$ ");
        let (event, mock) = drive(&mut readline, vec![ctrl('d')]);
        assert_eq!(event, ReadlineEvent::Eof);
        assert!(
            mock.get_copy_of_buffer_as_string_strip_ansi().contains("$ "),
            "prompt marker missing from output"
        );
    }

    #[test]
    fn test_custom_is_complete_predicate_wins() {
        // Predicate: complete only when the text ends with ';'.
        let mut readline = Readline::new();
        readline.set_is_complete(|text: &str| text.ends_with(';'));

        let mut events = keys("stmt");
        events.push(key(KeyCode::Enter));
        events.extend(keys(";"));
        events.push(key(KeyCode::Enter));

        let (event, _mock) = drive(&mut readline, events);
        assert_eq!(event, ReadlineEvent::Line("stmt\n;".into()));
    }

    #[test]
    fn test_history_dedup_on_submission() {
        let mut readline = Readline::new();
        for _ in 0..2 {
            let mut events = keys("same");
            events.push(key(KeyCode::Enter));
            let (event, _mock) = drive(&mut readline, events);
            assert_eq!(event, ReadlineEvent::Line("same".into()));
        }
        assert_eq!(readline.history_len(), 1);
    }
}
