// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Accumulation buffer for bytes that have been read but not yet decoded.
//!
//! Owned exclusively by the [`EventProducer`], so there is no locking.
//!
//! [`EventProducer`]: crate::EventProducer

use smallvec::SmallVec;

/// Inline capacity of the buffer.
///
/// Keyboard input is a handful of bytes per key press (1 for ASCII, up to 4 for a UTF-8
/// scalar, 3 to 6 for an escape sequence). A paste can be bigger, in which case the
/// storage spills to the heap.
pub const ACCUMULATION_BUFFER_INLINE_SIZE: usize = 256;

/// Default read granularity: how much the reader thread pulls from the device per
/// `read()` call.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 128;

/// Append at the tail, consume from the head.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │ data: [consumed bytes...][unconsumed bytes...]              │
/// │                          ^                                  │
/// │                          position                           │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// - Bytes before `position` have been decoded and can be discarded.
/// - Bytes from `position` onward are pending decoding.
/// - Consumed bytes are drained lazily, once `position` passes half the inline size
///   or everything has been consumed.
#[derive(Debug, Default)]
pub struct AccumulationBuffer {
    data: SmallVec<[u8; ACCUMULATION_BUFFER_INLINE_SIZE]>,
    position: usize,
}

impl AccumulationBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// A buffer that already holds `bytes`, e.g. leftovers from a previous session.
    #[must_use]
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut it = Self::new();
        it.append(bytes);
        it
    }

    /// The bytes that still have to be decoded.
    #[must_use]
    pub fn unconsumed(&self) -> &[u8] { &self.data[self.position..] }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.unconsumed().is_empty() }

    #[must_use]
    pub fn len(&self) -> usize { self.unconsumed().len() }

    pub fn append(&mut self, bytes: &[u8]) { self.data.extend_from_slice(bytes); }

    /// Drops `count` bytes from the head. Clamped to what is actually buffered.
    pub fn consume(&mut self, count: usize) {
        self.position = (self.position + count).min(self.data.len());

        if self.position == self.data.len() {
            self.data.clear();
            self.position = 0;
        } else if self.position > ACCUMULATION_BUFFER_INLINE_SIZE / 2 {
            self.data.drain(..self.position);
            self.position = 0;
        }
    }
}
