// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Key model and the pure byte → [`KeyEvent`] decoder. Nothing in here does I/O.

// Attach sources.
pub mod decoder;
pub mod escape_table;
pub mod key;
pub mod key_event;

// Re-export.
pub use decoder::*;
pub use escape_table::*;
pub use key::*;
pub use key_event::*;
