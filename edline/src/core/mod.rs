// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Leaf modules with no terminal dependency: cell geometry, display width,
//! and the UTF-8 edit buffer.

pub mod dimens;
pub mod display_width;
pub mod line_buffer;

pub use dimens::{ColIndex, ColWidth, RowHeight, RowIndex, Size, col, height, row, width};
pub use display_width::{TAB_STOP, char_display_width, next_tab_stop, str_display_width,
                        str_display_width_from};
pub use line_buffer::{BufferError, DEFAULT_MAX_LEN, EditBuffer, default_is_word_char};
