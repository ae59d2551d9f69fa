// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ReadinessSource, ReadinessWaker, SetupError};
use std::{io::{self, Read},
          sync::Arc};

/// The read side of the terminal, ready to hand to the reader thread.
#[allow(missing_debug_implementations)]
pub struct ArmedInput<D, R> {
    /// Non-blocking read descriptor.
    pub device: D,
    /// Fires when `device` may have data.
    pub readiness: R,
    /// Interrupts a wait on `readiness`. Registered with the [`QuitSignal`].
    ///
    /// [`QuitSignal`]: crate::QuitSignal
    pub waker: Arc<dyn ReadinessWaker>,
}

/// Operations the [`Console`] needs from the OS terminal layer.
///
/// [`TtyPlatform`] is the production implementation. Anything else (a PTY harness, a
/// scripted fake in tests) only has to provide these four operations.
///
/// [`Console`]: crate::Console
/// [`TtyPlatform`]: crate::TtyPlatform
pub trait TerminalPlatform: Send + 'static {
    /// Snapshot of the terminal's line discipline settings (termios on Unix).
    type Attributes: Clone + Send + 'static;
    type Device: Read + Send + 'static;
    type Readiness: ReadinessSource;

    /// # Errors
    ///
    /// The OS error, e.g. `ENOTTY` if the device is not a terminal.
    fn get_attributes(&self) -> io::Result<Self::Attributes>;

    /// Applies `attributes` immediately (no drain, no flush).
    ///
    /// # Errors
    ///
    /// The OS error.
    fn set_attributes(&self, attributes: &Self::Attributes) -> io::Result<()>;

    /// Raw mode derived from `original`: no echo, no canonical line editing, no signal
    /// keys, no CR/NL translation, no flow control, 8-bit bytes, and reads return as
    /// soon as one byte is available.
    fn make_raw(&self, original: &Self::Attributes) -> Self::Attributes;

    /// Makes the read side non-blocking and arranges readiness notification for it.
    /// Can only succeed once, since the read side moves into the result.
    ///
    /// # Errors
    ///
    /// [`SetupError::AsyncIoSetup`] naming the stage that failed.
    fn arm_async_notify(
        &mut self,
    ) -> Result<ArmedInput<Self::Device, Self::Readiness>, SetupError>;
}
