// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal resource management: scoped raw mode, buffered output, size.

pub mod output;
pub mod raw_mode;
pub mod size;

pub use output::OutputDevice;
pub use raw_mode::RawModeGuard;
pub use size::get_terminal_size;
