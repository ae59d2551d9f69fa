// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR

//! Dedicated reader thread: waits for readiness, drains the device, forwards chunks.
//!
//! The device is non-blocking and the readiness source is edge-triggered, so each
//! wake-up must drain the device until it reports [`WouldBlock`]. The thread is a plain
//! [`std::thread`] rather than a tokio blocking task, because it spends its life parked
//! in the kernel and must be interruptible through the [`ReadinessWaker`] when the
//! [`QuitSignal`] fires.
//!
//! # State machine
//!
//! ```text
//!                   ┌────────────────────┐
//!        ┌─────────▶│  WaitingForSignal  │──── quit fired ───────────┐
//!        │          └─────────┬──────────┘                           │
//!        │                    │ readiness (and quit not fired)       │
//!        │                    ▼                                      ▼
//!   WouldBlock /    ┌────────────────────┐   read error /   ┌──────────────────┐
//!   empty read  ────┤      Draining      ├── quit fired / ─▶│ Stopped(reason)  │
//!                   └────────────────────┘   channel closed └──────────────────┘
//! ```
//!
//! # Delivery rules
//!
//! - Each chunk is held back until the next `read()` tells whether more bytes were
//!   already waiting, then sent with that answer as its `more` flag. A chunk followed
//!   by [`WouldBlock`], an empty read, or a read error is sent with `more = false`.
//! - The quit signal is checked before every send. Once it has fired, read data is
//!   discarded.
//! - A read error is sent as [`RawChunk::Error`] and the thread stops, whether or not
//!   the send succeeded.
//! - [`Interrupted`] (`EINTR`) is retried, both for reads and readiness waits.
//! - A closed channel means the producer is gone, so the thread stops.
//!
//! [`Interrupted`]: std::io::ErrorKind::Interrupted
//! [`QuitSignal`]: crate::QuitSignal
//! [`ReadinessWaker`]: crate::ReadinessWaker
//! [`WouldBlock`]: std::io::ErrorKind::WouldBlock

use super::{QuitListener, RawChunk, RawChunkSender, ReadinessSource};
use crate::{Continuation, DEBUG_KEYBOARD_SHOW_PIPELINE, ReadError};
use std::{io::{self, ErrorKind, Read},
          thread::JoinHandle};

pub const READER_THREAD_NAME: &str = "keyboard-reader";

/// Where the [`InputReader`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Blocked on the [`ReadinessSource`].
    WaitingForSignal,
    /// Reading until the device reports [`WouldBlock`].
    ///
    /// [`WouldBlock`]: std::io::ErrorKind::WouldBlock
    Draining,
    /// Terminal. The thread returns `reason` from [`InputReader::run()`].
    Stopped(ReaderStopReason),
}

/// Why the reader thread exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStopReason {
    /// The quit signal fired.
    Cancelled,
    /// A read (or readiness wait) failed. The error was forwarded as a chunk.
    ReadFailed,
    /// The chunk channel's receiver was dropped.
    ProducerGone,
}

/// Owns the read side of the device for the lifetime of the reader thread.
///
/// Dropping the reader (when [`run()`] returns) closes the read descriptor and
/// deregisters it from the readiness source.
///
/// [`run()`]: Self::run
#[allow(missing_debug_implementations)]
pub struct InputReader<D, R> {
    device: D,
    readiness: R,
    chunk_tx: RawChunkSender,
    quit: QuitListener,
    read_buffer: Vec<u8>,
    /// Bytes from the previous `read()` of this drain, not yet sent.
    held_chunk: Option<Vec<u8>>,
}

impl<D, R> InputReader<D, R>
where
    D: Read + Send + 'static,
    R: ReadinessSource,
{
    /// `read_chunk_size` is the size of each `read()` call. `0` is treated as `1`.
    pub fn new(
        device: D,
        readiness: R,
        chunk_tx: RawChunkSender,
        quit: QuitListener,
        read_chunk_size: usize,
    ) -> Self {
        Self {
            device,
            readiness,
            chunk_tx,
            quit,
            read_buffer: vec![0; read_chunk_size.max(1)],
            held_chunk: None,
        }
    }

    /// Runs the state machine to completion on the current thread.
    pub fn run(mut self) -> ReaderStopReason {
        let mut state = ReaderState::WaitingForSignal;
        loop {
            state = match state {
                ReaderState::WaitingForSignal => self.wait_for_signal(),
                ReaderState::Draining => self.drain(),
                ReaderState::Stopped(reason) => {
                    tracing::debug!(message = "reader-thread: stopped", ?reason);
                    return reason;
                }
            };
        }
    }

    fn wait_for_signal(&mut self) -> ReaderState {
        if self.quit.is_fired() {
            return ReaderState::Stopped(ReaderStopReason::Cancelled);
        }

        loop {
            match self.readiness.wait_for_readiness() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return ReaderState::Stopped(self.fail(err)),
            }
        }

        if self.quit.is_fired() {
            ReaderState::Stopped(ReaderStopReason::Cancelled)
        } else {
            ReaderState::Draining
        }
    }

    fn drain(&mut self) -> ReaderState {
        loop {
            match self.read_once() {
                Ok(Continuation::Continue) => {}
                Ok(Continuation::Stop) => return ReaderState::WaitingForSignal,
                Err(reason) => return ReaderState::Stopped(reason),
            }
        }
    }

    /// One `read()` call. [`Continuation::Stop`] ends the drain, an `Err` ends the
    /// thread.
    fn read_once(&mut self) -> Result<Continuation, ReaderStopReason> {
        match self.device.read(&mut self.read_buffer) {
            // An end-of-file device keeps reporting 0 bytes; wait for readiness again
            // instead of spinning.
            Ok(0) => {
                self.release_held_chunk()?;
                self.deliver(RawChunk::Data {
                    bytes: vec![],
                    more: false,
                })?;
                Ok(Continuation::Stop)
            }
            Ok(bytes_read) => {
                DEBUG_KEYBOARD_SHOW_PIPELINE.then(|| {
                    tracing::debug!(message = "reader-thread: read bytes", bytes_read);
                });
                let bytes = self.read_buffer[..bytes_read].to_vec();
                if let Some(previous) = self.held_chunk.replace(bytes) {
                    self.deliver(RawChunk::Data {
                        bytes: previous,
                        more: true,
                    })?;
                }
                Ok(Continuation::Continue)
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                self.release_held_chunk()?;
                Ok(Continuation::Stop)
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => Ok(Continuation::Continue),
            Err(err) => {
                self.release_held_chunk()?;
                Err(self.fail(err))
            }
        }
    }

    /// Sends the held chunk, if any, as the last one before the device ran dry.
    fn release_held_chunk(&mut self) -> Result<(), ReaderStopReason> {
        match self.held_chunk.take() {
            Some(bytes) => self.deliver(RawChunk::Data { bytes, more: false }),
            None => Ok(()),
        }
    }

    /// Forwards the error, then stops. Delivery failure does not change the outcome
    /// unless the quit signal got there first.
    fn fail(&self, err: io::Error) -> ReaderStopReason {
        tracing::debug!(message = "reader-thread: read failed", error = ?err);
        match self.deliver(RawChunk::Error(ReadError::from(err))) {
            Err(ReaderStopReason::Cancelled) => ReaderStopReason::Cancelled,
            Ok(()) | Err(_) => ReaderStopReason::ReadFailed,
        }
    }

    fn deliver(&self, chunk: RawChunk) -> Result<(), ReaderStopReason> {
        if self.quit.is_fired() {
            return Err(ReaderStopReason::Cancelled);
        }
        self.chunk_tx
            .send(chunk)
            .map_err(|_| ReaderStopReason::ProducerGone)
    }
}

/// Moves `reader` onto a new thread named [`READER_THREAD_NAME`].
///
/// # Errors
///
/// Returns the OS error if the thread cannot be created. `reader` is dropped in that
/// case, closing the read descriptor.
pub fn spawn_reader_thread<D, R>(
    reader: InputReader<D, R>,
) -> io::Result<JoinHandle<ReaderStopReason>>
where
    D: Read + Send + 'static,
    R: ReadinessSource,
{
    std::thread::Builder::new()
        .name(READER_THREAD_NAME.into())
        .spawn(move || reader.run())
}
