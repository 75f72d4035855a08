// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal color support detection with caching and override.
//!
//! Detection examines the environment once and caches the result; hosts (and
//! tests) can force a value with [`global_color_support::set_override`], which
//! takes precedence over both the cache and fresh detection.

use std::env;
use std::io::{IsTerminal, stdout};
use std::sync::atomic::{AtomicI8, Ordering};

/// Whether SGR color sequences may be written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorSupport {
    Ansi16,
    NoColor,
}

/// Global detect/override/cache state for color support.
pub mod global_color_support {
    use super::{AtomicI8, ColorSupport, Ordering, examine_env_vars_to_determine_color_support};

    const NOT_SET_VALUE: i8 = -1;
    const ANSI16_VALUE: i8 = 1;
    const NO_COLOR_VALUE: i8 = 0;

    static COLOR_SUPPORT_OVERRIDE: AtomicI8 = AtomicI8::new(NOT_SET_VALUE);
    static COLOR_SUPPORT_CACHED: AtomicI8 = AtomicI8::new(NOT_SET_VALUE);

    fn encode(value: ColorSupport) -> i8 {
        match value {
            ColorSupport::Ansi16 => ANSI16_VALUE,
            ColorSupport::NoColor => NO_COLOR_VALUE,
        }
    }

    fn decode(value: i8) -> Option<ColorSupport> {
        match value {
            ANSI16_VALUE => Some(ColorSupport::Ansi16),
            NO_COLOR_VALUE => Some(ColorSupport::NoColor),
            _ => None,
        }
    }

    /// Force a specific color support level, bypassing detection.
    pub fn set_override(value: ColorSupport) {
        COLOR_SUPPORT_OVERRIDE.store(encode(value), Ordering::Release);
    }

    /// Remove the override; [`detect`] falls back to (cached) detection.
    pub fn clear_override() {
        COLOR_SUPPORT_OVERRIDE.store(NOT_SET_VALUE, Ordering::Release);
    }

    /// Drop the cached detection result (tests that mutate the environment).
    pub fn clear_cache() { COLOR_SUPPORT_CACHED.store(NOT_SET_VALUE, Ordering::Release); }

    /// Color support for stdout: override if set, else the cached detection,
    /// else a fresh detection that populates the cache.
    #[must_use]
    pub fn detect() -> ColorSupport {
        if let Some(forced) = decode(COLOR_SUPPORT_OVERRIDE.load(Ordering::Acquire)) {
            return forced;
        }
        if let Some(cached) = decode(COLOR_SUPPORT_CACHED.load(Ordering::Acquire)) {
            return cached;
        }
        let detected = examine_env_vars_to_determine_color_support();
        COLOR_SUPPORT_CACHED.store(encode(detected), Ordering::Release);
        detected
    }
}

/// One-shot environment examination. Call [`global_color_support::detect`]
/// instead; this bypasses the cache.
#[must_use]
pub fn examine_env_vars_to_determine_color_support() -> ColorSupport {
    // https://no-color.org/ - any non-empty value disables color.
    if env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
        return ColorSupport::NoColor;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return ColorSupport::NoColor;
        }
    }

    if !stdout().is_terminal() {
        return ColorSupport::NoColor;
    }

    ColorSupport::Ansi16
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_override_beats_detection() {
        global_color_support::set_override(ColorSupport::NoColor);
        assert_eq!(global_color_support::detect(), ColorSupport::NoColor);

        global_color_support::set_override(ColorSupport::Ansi16);
        assert_eq!(global_color_support::detect(), ColorSupport::Ansi16);

        global_color_support::clear_override();
        global_color_support::clear_cache();
    }

    #[test]
    #[serial]
    fn test_detection_is_cached() {
        global_color_support::clear_override();
        global_color_support::clear_cache();
        let first = global_color_support::detect();
        let second = global_color_support::detect();
        assert_eq!(first, second);
        global_color_support::clear_cache();
    }
}
