// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios SIGWINCH wcwidth

//! # `r3bl_edline`
//!
//! A portable line-editing library for interactive command-line programs: a
//! drop-in alternative to the classic readline facility that works across
//! POSIX terminals and Windows consoles using only a minimal subset of ANSI
//! escape sequences.
//!
//! Call [`Readline::read_line`] with a prompt and get back a single line (or
//! multiline block) of user input, with rich in-terminal editing:
//!
//! - cursor motion by code point, word, and logical line,
//! - kill/yank, transpose, and snapshot undo/redo with run coalescing,
//! - persistent history with incremental reverse search (`Ctrl+R`),
//! - tab completion with a candidate menu and inline preview,
//! - host-pluggable syntax highlighting,
//! - UTF-8 awareness including wide East-Asian and combining code points,
//! - bracketed multiline input with a bracket/quote balance detector.
//!
//! ## Quick start
//!
//! ```no_run
//! use r3bl_edline::{Readline, ReadlineEvent};
//!
//! let mut readline = Readline::new();
//! loop {
//!     match readline.read_line("repl") {
//!         ReadlineEvent::Line(line) => println!("you typed {line:?}"),
//!         ReadlineEvent::Eof | ReadlineEvent::Interrupted => break,
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! Leaves-first: [`core`] (cell geometry, display width, the UTF-8 edit
//! buffer) has no terminal dependency; [`ansi`] defines the escape
//! vocabulary; [`input`] decodes raw bytes (or Windows console records) into
//! key events; [`terminal`] owns raw mode, sizing, and buffered output;
//! [`history`] and [`completion`] are the data stores behind the two modal
//! overlays; [`editor`] is the key-dispatch state machine; [`render`] diffs
//! logical frames onto the screen; [`readline`] ties it together.
//!
//! Concurrency model: single-threaded and cooperative. The only blocking
//! point is the input device poll (stdin + `SIGWINCH`, with a 100 ms timeout
//! to tell a lone `ESC` from an escape sequence). Raw mode is a scoped
//! guard, restored on every exit path including panics.

pub mod ansi;
pub mod completion;
pub mod config;
pub mod core;
pub mod editor;
pub mod history;
pub mod input;
pub mod readline;
pub mod render;
pub mod terminal;
pub mod test_fixtures;

pub use ansi::{AnsiColor, ColorSupport, CsiSequence, SgrCode, global_color_support};
pub use completion::{Candidate, Completer, CompletionSet, WordCompletionConfig, complete_filename,
                     complete_quoted_word, complete_word};
pub use config::EditorConfig;
pub use core::{BufferError, ColIndex, ColWidth, EditBuffer, RowHeight, RowIndex, Size, col,
               height, row, width};
pub use editor::{DispatchOutcome, EditorContext, EditorMode, EngineSignal, LineEditor};
pub use history::{History, SearchDirection};
pub use input::{InputDevice, InputEvent, KeyCode, KeyModifiers, KeyPress};
pub use readline::{Readline, ReadlineEvent};
pub use render::{Highlighter, PaintSpan, Renderer};
pub use terminal::{OutputDevice, RawModeGuard, get_terminal_size};
