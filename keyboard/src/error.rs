// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Error types for console setup and for the running input pipeline.
//!
//! Setup failures ([`SetupError`]) are returned synchronously from [`Console::open()`]
//! and carry [`miette`] diagnostics. Runtime read failures ([`ReadError`]) are not
//! returned from any function: they travel down the pipeline exactly once, as
//! [`KeyEvent::Error`], after which the pipeline stops.
//!
//! [`Console::open()`]: crate::Console::open
//! [`KeyEvent::Error`]: crate::KeyEvent::Error

use miette::Diagnostic;
use std::{io, path::PathBuf};

/// Failed to bring the console into raw input mode.
///
/// No partial state is left behind when this is returned: descriptors that were opened
/// are closed, and terminal attributes that were changed are restored.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum SetupError {
    /// The terminal device could not be opened for reading and writing.
    #[error("Failed to open terminal device {path:?}")]
    #[diagnostic(
        code(r3bl_keyboard::setup::device),
        help("Make sure the process has a controlling terminal (is it running under a pipe or a daemon?)")
    )]
    Device {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The line discipline attributes could not be queried or applied.
    #[error("Failed to {action} terminal attributes")]
    #[diagnostic(
        code(r3bl_keyboard::setup::terminal_config),
        help("The device must be a tty; `stty -a < /dev/tty` shows its current settings")
    )]
    TerminalConfig {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    /// Readiness notification could not be armed on the read descriptor.
    #[error("Failed to arm readiness notification ({stage})")]
    #[diagnostic(
        code(r3bl_keyboard::setup::async_io),
        help("This usually means the system ran out of file descriptors or threads")
    )]
    AsyncIoSetup {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    /// The event producer needs a tokio runtime and none is running on this thread.
    #[error("No tokio runtime is available to run the event producer task")]
    #[diagnostic(
        code(r3bl_keyboard::setup::no_runtime),
        help("Call `Console::open()` from inside a tokio runtime (e.g. `#[tokio::main]`)")
    )]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
}

/// A read from the terminal device failed with something other than "would block".
///
/// Unlike [`io::Error`] this is [`Clone`] and [`PartialEq`], so it can travel inside a
/// [`KeyEvent`] and be asserted on in tests.
///
/// [`KeyEvent`]: crate::KeyEvent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Terminal read failed ({kind}): {message}")]
pub struct ReadError {
    pub kind: io::ErrorKind,
    pub message: String,
}

impl From<io::Error> for ReadError {
    fn from(error: io::Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
