// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words winsize tcgetwinsize ioctl

//! Terminal size query, re-run on every resize wake.

use crate::core::dimens::Size;

/// Columns and rows of the controlling terminal.
///
/// POSIX: `tcgetwinsize()` on stdout, falling back to the `COLUMNS` / `LINES`
/// environment variables when the ioctl fails or reports zero (some terminal
/// multiplexers do), and finally to the classic 80x24.
#[must_use]
pub fn get_terminal_size() -> Size {
    query_platform_size()
        .or_else(env_fallback_size)
        .unwrap_or_else(|| Size::new(80_u16, 24_u16))
}

#[cfg(unix)]
fn query_platform_size() -> Option<Size> {
    let winsize = rustix::termios::tcgetwinsize(std::io::stdout()).ok()?;
    if winsize.ws_col == 0 || winsize.ws_row == 0 {
        return None;
    }
    Some(Size::new(winsize.ws_col, winsize.ws_row))
}

#[cfg(windows)]
fn query_platform_size() -> Option<Size> {
    let (cols, rows) = crossterm::terminal::size().ok()?;
    if cols == 0 || rows == 0 {
        return None;
    }
    Some(Size::new(cols, rows))
}

fn env_fallback_size() -> Option<Size> {
    let cols: u16 = std::env::var("COLUMNS").ok()?.parse().ok()?;
    let rows: u16 = std::env::var("LINES").ok()?.parse().ok()?;
    if cols == 0 || rows == 0 {
        return None;
    }
    Some(Size::new(cols, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimens::{height, width};
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_fallback() {
        // SAFETY: guarded by #[serial]; no other test thread reads these vars
        // concurrently.
        unsafe {
            std::env::set_var("COLUMNS", "120");
            std::env::set_var("LINES", "40");
        }
        let size = env_fallback_size().unwrap();
        assert_eq!(size.col_width, width(120u16));
        assert_eq!(size.row_height, height(40u16));
        unsafe {
            std::env::remove_var("COLUMNS");
            std::env::remove_var("LINES");
        }
    }

    #[test]
    #[serial]
    fn test_size_has_sane_default() {
        unsafe {
            std::env::remove_var("COLUMNS");
            std::env::remove_var("LINES");
        }
        let size = get_terminal_size();
        assert!(!size.col_width.is_zero());
        assert!(!size.row_height.is_zero());
    }
}
