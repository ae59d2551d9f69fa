// Copyright (c) 2023-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Turns on per-chunk and per-event `debug` logging in the input pipeline. Lifecycle
/// logging (open, close, stop reasons) is always on.
pub const DEBUG_KEYBOARD_SHOW_PIPELINE: bool = false;

/// Control flow signal for loops and threads.
///
/// Used by the [reader thread] drain loop and by the [event producer] decode loop.
///
/// [event producer]: crate::EventProducer
/// [reader thread]: crate::InputReader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    /// Continue to the next iteration.
    #[default]
    Continue,

    /// Stop processing and exit the loop/thread.
    Stop,
}
