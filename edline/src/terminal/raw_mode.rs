// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios cfmakeraw VMIN VTIME ICANON IXON OPOST

//! Raw mode as a scoped acquisition.
//!
//! [`RawModeGuard::enter`] is the only way to flip the terminal into raw
//! mode. The original attributes are stashed in a process-wide slot; the
//! guard's `Drop` restores them, and a panic hook (installed once, on first
//! entry) restores them on any panicking exit path, so the shell never gets a
//! terminal stuck in raw mode.

use std::sync::Once;

#[cfg(unix)]
mod unix_impl {
    use miette::miette;
    use rustix::termios::{self, ControlModes, InputModes, LocalModes, OptionalActions,
                          SpecialCodeIndex, Termios};
    use std::io;
    use std::sync::{LazyLock, Mutex};

    /// Stores the original terminal settings to restore later.
    static ORIGINAL_TERMIOS: LazyLock<Mutex<Option<Termios>>> =
        LazyLock::new(|| Mutex::new(None));

    /// Enable raw mode using rustix's type-safe termios API: save the
    /// original settings, then apply the `cfmakeraw()` set with VMIN=1,
    /// VTIME=0 for byte-by-byte reads.
    pub fn enable_raw_mode() -> miette::Result<()> {
        let stdin = io::stdin();
        let mut termios = termios::tcgetattr(&stdin)
            .map_err(|e| miette!("failed to retrieve terminal attributes: {e}"))?;

        {
            let mut original = ORIGINAL_TERMIOS
                .lock()
                .map_err(|e| miette!("terminal settings lock poisoned: {e}"))?;
            if original.is_none() {
                *original = Some(termios.clone());
            }
        }

        termios.input_modes.remove(
            InputModes::IGNBRK
                | InputModes::BRKINT
                | InputModes::PARMRK
                | InputModes::ISTRIP
                | InputModes::INLCR
                | InputModes::IGNCR
                | InputModes::ICRNL
                | InputModes::IXON,
        );
        termios
            .output_modes
            .remove(rustix::termios::OutputModes::OPOST);
        termios.local_modes.remove(
            LocalModes::ECHO
                | LocalModes::ECHONL
                | LocalModes::ICANON
                | LocalModes::ISIG
                | LocalModes::IEXTEN,
        );
        termios
            .control_modes
            .remove(ControlModes::CSIZE | ControlModes::PARENB);
        termios.control_modes.insert(ControlModes::CS8);

        termios.special_codes[SpecialCodeIndex::VMIN] = 1;
        termios.special_codes[SpecialCodeIndex::VTIME] = 0;

        termios::tcsetattr(&stdin, OptionalActions::Now, &termios)
            .map_err(|e| miette!("failed to set terminal attributes: {e}"))?;

        Ok(())
    }

    /// Restore the settings saved by `enable_raw_mode()`. No-op if raw mode
    /// was never enabled.
    pub fn disable_raw_mode() -> miette::Result<()> {
        let original = ORIGINAL_TERMIOS
            .lock()
            .map_err(|e| miette!("terminal settings lock poisoned: {e}"))?;
        if let Some(ref termios) = *original {
            let stdin = io::stdin();
            termios::tcsetattr(&stdin, OptionalActions::Now, termios)
                .map_err(|e| miette!("failed to set terminal attributes: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(windows)]
mod windows_impl {
    use miette::IntoDiagnostic as _;

    /// Delegates to crossterm, which drives `SetConsoleMode()` to disable
    /// line input, echo, and processed input.
    pub fn enable_raw_mode() -> miette::Result<()> {
        crossterm::terminal::enable_raw_mode().into_diagnostic()
    }

    pub fn disable_raw_mode() -> miette::Result<()> {
        crossterm::terminal::disable_raw_mode().into_diagnostic()
    }
}

#[cfg(unix)]
use unix_impl::{disable_raw_mode, enable_raw_mode};
#[cfg(windows)]
use windows_impl::{disable_raw_mode, enable_raw_mode};

static PANIC_HOOK: Once = Once::new();

/// Re-apply raw mode after a caught host-callback panic: the panic hook has
/// already restored the terminal, but the engine keeps running.
pub(crate) fn reapply() -> miette::Result<()> { enable_raw_mode() }

/// RAII wrapper: raw mode is held exactly as long as this value lives.
#[derive(Debug)]
pub struct RawModeGuard {
    restored: bool,
}

impl RawModeGuard {
    /// Enter raw mode. On first use, chains a panic hook that restores the
    /// terminal before the default hook prints the panic message (otherwise
    /// the message renders unreadable with OPOST off).
    ///
    /// # Errors
    ///
    /// Terminal attributes cannot be read or set (e.g. stdin is not a tty).
    pub fn enter() -> miette::Result<Self> {
        PANIC_HOOK.call_once(|| {
            let previous = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _unused = disable_raw_mode();
                previous(info);
            }));
        });

        enable_raw_mode()?;
        tracing::debug!("raw mode enabled");
        Ok(Self { restored: false })
    }

    /// Restore early, reporting failure (Drop swallows it).
    ///
    /// # Errors
    ///
    /// Terminal attributes cannot be restored.
    pub fn restore(mut self) -> miette::Result<()> {
        self.restored = true;
        tracing::debug!("raw mode disabled");
        disable_raw_mode()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _unused = disable_raw_mode();
            tracing::debug!("raw mode disabled (drop)");
        }
    }
}
