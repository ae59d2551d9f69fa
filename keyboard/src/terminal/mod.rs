// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! OS terminal layer: attributes (raw mode) and arming the read side for async input.

// Attach sources.
pub mod platform;
pub mod tty_platform;

// Re-export.
pub use platform::*;
pub use tty_platform::*;
