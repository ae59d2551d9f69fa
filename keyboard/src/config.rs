// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Knobs for [`Console::open()`].
//!
//! [`Console::open()`]: crate::Console::open

use crate::{DEFAULT_READ_CHUNK_SIZE, EscapeTable};
use std::{path::PathBuf, sync::Arc};

/// Controlling terminal of the process, regardless of what stdin/stdout point at.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/tty";

pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 32;

/// What the event producer does with bytes that can never become valid UTF-8.
///
/// Either way exactly one byte is dropped and decoding resumes at the next one, so a
/// stray byte never stalls the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidInputPolicy {
    /// Drop the byte silently (logged at `debug`).
    #[default]
    SkipByte,
    /// Drop the byte and emit [`char::REPLACEMENT_CHARACTER`] in its place.
    Replace,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub device_path: PathBuf,
    pub escape_table: Arc<EscapeTable>,
    /// Bytes per `read()` call in the reader thread.
    pub read_chunk_size: usize,
    /// Decoded events buffered between the producer task and the application.
    pub event_channel_capacity: usize,
    pub invalid_input_policy: InvalidInputPolicy,
}

impl Default for ConsoleConfig {
    /// Same as [`ConsoleConfig::from_env()`].
    fn default() -> Self { Self::from_env() }
}

impl ConsoleConfig {
    /// Defaults, with the escape table chosen from `$TERM` (xterm if unset).
    #[must_use]
    pub fn from_env() -> Self {
        let escape_table = match std::env::var("TERM") {
            Ok(term) => EscapeTable::for_terminal(&term),
            Err(_) => EscapeTable::xterm(),
        };
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            escape_table: Arc::new(escape_table),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            invalid_input_policy: InvalidInputPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_device_path(mut self, device_path: impl Into<PathBuf>) -> Self {
        self.device_path = device_path.into();
        self
    }

    #[must_use]
    pub fn with_escape_table(mut self, escape_table: impl Into<Arc<EscapeTable>>) -> Self {
        self.escape_table = escape_table.into();
        self
    }

    #[must_use]
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    #[must_use]
    pub fn with_event_channel_capacity(mut self, event_channel_capacity: usize) -> Self {
        self.event_channel_capacity = event_channel_capacity;
        self
    }

    #[must_use]
    pub fn with_invalid_input_policy(mut self, policy: InvalidInputPolicy) -> Self {
        self.invalid_input_policy = policy;
        self
    }
}
