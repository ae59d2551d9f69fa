// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Channels that connect the pipeline stages.
//!
//! ```text
//! ┌───────────────────┐  RawChunk   ┌──────────────────┐  KeyEvent   ┌─────────────┐
//! │ reader thread     ├────────────▶│ producer task    ├────────────▶│ application │
//! │ (std::thread)     │  unbounded  │ (tokio task)     │  bounded    │             │
//! └───────────────────┘             └──────────────────┘             └─────────────┘
//! ```
//!
//! The chunk channel is unbounded because its sender lives on a plain thread that must
//! never block on a send it cannot cancel. The event channel is bounded, and every send
//! on it is raced against the [`QuitListener`] in a [`tokio::select!`].
//!
//! [`QuitListener`]: crate::QuitListener

use crate::{KeyEvent, ReadError};

/// One read result from the terminal device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawChunk {
    /// Bytes from one successful `read()`. May be empty.
    Data {
        bytes: Vec<u8>,
        /// `false` when the device had nothing more to read right after these bytes.
        /// Only then is a trailing lone `ESC` the Esc key rather than the start of an
        /// escape sequence.
        more: bool,
    },
    /// A read failed. This is the last chunk the reader thread ever sends.
    Error(ReadError),
}

/// Sender end of the chunk channel, held by the reader thread.
pub type RawChunkSender = tokio::sync::mpsc::UnboundedSender<RawChunk>;

/// Receiver end of the chunk channel, held by the producer task.
pub type RawChunkReceiver = tokio::sync::mpsc::UnboundedReceiver<RawChunk>;

/// Sender end of the event channel, held by the producer task.
pub type KeyEventSender = tokio::sync::mpsc::Sender<KeyEvent>;

/// Receiver end of the event channel, wrapped by [`KeyEvents`].
///
/// [`KeyEvents`]: crate::KeyEvents
pub type KeyEventReceiver = tokio::sync::mpsc::Receiver<KeyEvent>;

#[must_use]
pub fn raw_chunk_channel() -> (RawChunkSender, RawChunkReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// A `capacity` of `0` is bumped to `1`, since [`tokio::sync::mpsc::channel`] has no
/// rendezvous mode.
#[must_use]
pub fn key_event_channel(capacity: usize) -> (KeyEventSender, KeyEventReceiver) {
    tokio::sync::mpsc::channel(capacity.max(1))
}
