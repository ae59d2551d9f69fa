// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Event producer: the tokio task between the reader thread and the application.
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//! RawChunk ──recv()──▶│ append to AccumulationBuffer                 │
//!                     │ loop {                                       │
//!                     │   decode(buffer.unconsumed(), table) {       │
//!                     │     Event      → consume, send ─────────────────▶ KeyEvent
//!                     │     Invalid    → InvalidInputPolicy          │
//!                     │     Incomplete → break, wait for next chunk  │
//!                     │   }                                          │
//!                     │ }                                            │
//!                     │ lone ESC left and !more → Esc ───────────────────▶ KeyEvent
//!                     │                                              │
//!                     └──────────────────────────────────────────────┘
//! ```
//!
//! Every await point is a [`tokio::select!`] that is `biased` toward the
//! [`QuitListener`], so once the quit signal fires nothing else is delivered. Partially
//! buffered bytes are dropped on cancellation.

use super::{AccumulationBuffer, KeyEventSender, QuitListener, RawChunk, RawChunkReceiver};
use crate::{DEBUG_KEYBOARD_SHOW_PIPELINE, Decoded, ESC_BYTE, EscapeTable,
            InvalidInputPolicy, Key, KeyEvent, decode};
use std::sync::Arc;
use tokio::{runtime::Handle, task::JoinHandle};

/// Why the producer task exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerStopReason {
    /// The quit signal fired.
    Cancelled,
    /// The reader reported a read error, which was forwarded as [`KeyEvent::Error`].
    InputError,
    /// The chunk channel closed without an error chunk.
    ReaderGone,
    /// The application dropped its end of the event channel.
    ConsumerGone,
}

#[derive(Debug)]
pub struct EventProducer {
    buffer: AccumulationBuffer,
    escape_table: Arc<EscapeTable>,
    invalid_input_policy: InvalidInputPolicy,
    chunk_rx: RawChunkReceiver,
    event_tx: KeyEventSender,
    quit: QuitListener,
}

impl EventProducer {
    #[must_use]
    pub fn new(
        chunk_rx: RawChunkReceiver,
        event_tx: KeyEventSender,
        quit: QuitListener,
        escape_table: Arc<EscapeTable>,
        invalid_input_policy: InvalidInputPolicy,
    ) -> Self {
        Self {
            buffer: AccumulationBuffer::new(),
            escape_table,
            invalid_input_policy,
            chunk_rx,
            event_tx,
            quit,
        }
    }

    /// Starts from `buffer` instead of an empty one. Whatever it holds is decoded
    /// before the first chunk is awaited.
    #[must_use]
    pub fn with_buffer(mut self, buffer: AccumulationBuffer) -> Self {
        self.buffer = buffer;
        self
    }

    /// Runs until cancelled, until the input ends, or until the consumer goes away.
    pub async fn run(mut self) -> ProducerStopReason {
        let reason = self.produce().await;
        tracing::debug!(
            message = "producer-task: stopped",
            ?reason,
            dropped_bytes = self.buffer.len()
        );
        reason
    }

    async fn produce(&mut self) -> ProducerStopReason {
        if let Err(reason) = self.decode_buffered().await {
            return reason;
        }

        loop {
            let maybe_chunk = tokio::select! {
                biased;
                () = self.quit.fired() => return ProducerStopReason::Cancelled,
                maybe_chunk = self.chunk_rx.recv() => maybe_chunk,
            };

            let result = match maybe_chunk {
                None => Err(ProducerStopReason::ReaderGone),
                Some(RawChunk::Error(error)) => self
                    .deliver(KeyEvent::Error(error))
                    .await
                    .and(Err(ProducerStopReason::InputError)),
                Some(RawChunk::Data { bytes, more }) => {
                    DEBUG_KEYBOARD_SHOW_PIPELINE.then(|| {
                        tracing::debug!(
                            message = "producer-task: chunk",
                            bytes = ?bytes,
                            more,
                            buffered = self.buffer.len()
                        );
                    });
                    self.buffer.append(&bytes);
                    match self.decode_buffered().await {
                        Ok(()) if !more => self.resolve_lone_escape().await,
                        result => result,
                    }
                }
            };

            if let Err(reason) = result {
                return reason;
            }
        }
    }

    /// With nothing more waiting on the device, a buffered lone `ESC` cannot grow into
    /// an escape sequence, so it is the Esc key.
    async fn resolve_lone_escape(&mut self) -> Result<(), ProducerStopReason> {
        if self.buffer.unconsumed() != [ESC_BYTE] {
            return Ok(());
        }
        self.buffer.consume(1);
        self.deliver(KeyEvent::Key(Key::Esc)).await
    }

    /// Decodes and delivers events until the buffer is empty or holds only an
    /// incomplete sequence.
    async fn decode_buffered(&mut self) -> Result<(), ProducerStopReason> {
        loop {
            match decode(self.buffer.unconsumed(), &self.escape_table) {
                Decoded::Incomplete => return Ok(()),
                Decoded::Event { consumed, event } => {
                    self.buffer.consume(consumed);
                    self.deliver(event).await?;
                }
                Decoded::Invalid => {
                    let byte = self.buffer.unconsumed().first().copied();
                    self.buffer.consume(1);
                    match self.invalid_input_policy {
                        InvalidInputPolicy::SkipByte => {
                            tracing::debug!(
                                message = "producer-task: skipped invalid byte",
                                byte = ?byte
                            );
                        }
                        InvalidInputPolicy::Replace => {
                            self.deliver(KeyEvent::Char(char::REPLACEMENT_CHARACTER))
                                .await?;
                        }
                    }
                }
            }
        }
    }

    async fn deliver(&mut self, event: KeyEvent) -> Result<(), ProducerStopReason> {
        if self.quit.is_fired() {
            return Err(ProducerStopReason::Cancelled);
        }

        DEBUG_KEYBOARD_SHOW_PIPELINE.then(|| {
            tracing::debug!(message = "producer-task: event", event = %event);
        });

        tokio::select! {
            biased;
            () = self.quit.fired() => Err(ProducerStopReason::Cancelled),
            result = self.event_tx.send(event) => {
                result.map_err(|_| ProducerStopReason::ConsumerGone)
            }
        }
    }
}

/// Spawns [`EventProducer::run()`] on `runtime`.
pub fn spawn_event_producer(
    producer: EventProducer,
    runtime: &Handle,
) -> JoinHandle<ProducerStopReason> {
    runtime.spawn(producer.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyEventReceiver, QuitSignal, RawChunkSender, ReadError,
                key_event_channel, raw_chunk_channel};
    use pretty_assertions::assert_eq;
    use std::{io::ErrorKind, time::Duration};
    use tokio::sync::mpsc::error::TryRecvError;

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Harness {
        chunk_tx: RawChunkSender,
        event_rx: KeyEventReceiver,
        quit: QuitSignal,
        producer: EventProducer,
    }

    fn harness(policy: InvalidInputPolicy, capacity: usize) -> Harness {
        let (chunk_tx, chunk_rx) = raw_chunk_channel();
        let (event_tx, event_rx) = key_event_channel(capacity);
        let quit = QuitSignal::new();
        let producer = EventProducer::new(
            chunk_rx,
            event_tx,
            quit.listener(),
            Arc::new(EscapeTable::xterm()),
            policy,
        );
        Harness {
            chunk_tx,
            event_rx,
            quit,
            producer,
        }
    }

    fn data(bytes: &[u8]) -> RawChunk {
        RawChunk::Data {
            bytes: bytes.to_vec(),
            more: false,
        }
    }

    fn data_with_more(bytes: &[u8]) -> RawChunk {
        RawChunk::Data {
            bytes: bytes.to_vec(),
            more: true,
        }
    }

    async fn next(event_rx: &mut KeyEventReceiver) -> Option<KeyEvent> {
        tokio::time::timeout(TIMEOUT, event_rx.recv()).await.unwrap()
    }

    async fn let_producer_run() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_function_key_then_char() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\x1bOPa")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::F(1))));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('a')));

        drop(chunk_tx);
        assert_eq!(task.await.unwrap(), ProducerStopReason::ReaderGone);
    }

    #[tokio::test]
    async fn test_unknown_escape_run_is_one_esc() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\x1bZ")).unwrap();
        chunk_tx.send(data(b"b")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::Esc)));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('b')));

        drop(chunk_tx);
        assert_eq!(task.await.unwrap(), ProducerStopReason::ReaderGone);
    }

    #[tokio::test]
    async fn test_lone_escape_then_next_key_are_separate_events() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let _task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\x1b")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::Esc)));

        chunk_tx.send(data(b"q")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('q')));
    }

    #[tokio::test]
    async fn test_escape_with_more_waits_for_sequence() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let _task = tokio::spawn(producer.run());

        chunk_tx.send(data_with_more(b"a\x1b")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('a')));
        let_producer_run().await;
        assert_eq!(event_rx.try_recv(), Err(TryRecvError::Empty));

        chunk_tx.send(data(b"OP")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::F(1))));
    }

    #[tokio::test]
    async fn test_partial_sequence_without_more_still_waits() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let _task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\x1b[1")).unwrap();
        let_producer_run().await;
        assert_eq!(event_rx.try_recv(), Err(TryRecvError::Empty));

        chunk_tx.send(data(b"5~")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::F(5))));
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks_yields_one_event() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let _task = tokio::spawn(producer.run());

        let euro = "€".as_bytes();
        chunk_tx.send(data(&euro[..1])).unwrap();
        chunk_tx.send(data(&euro[1..2])).unwrap();
        let_producer_run().await;
        assert_eq!(event_rx.try_recv(), Err(TryRecvError::Empty));

        chunk_tx.send(data(&euro[2..])).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('€')));
        let_producer_run().await;
        assert_eq!(event_rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_error_after_data_ends_sequence() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let task = tokio::spawn(producer.run());

        let error = ReadError {
            kind: ErrorKind::BrokenPipe,
            message: "hangup".into(),
        };
        chunk_tx.send(data(b"x")).unwrap();
        chunk_tx.send(data(b"y")).unwrap();
        chunk_tx.send(RawChunk::Error(error.clone())).unwrap();
        // Never decoded: the producer stops at the error.
        let _unused = chunk_tx.send(data(b"z"));

        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('x')));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('y')));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Error(error)));
        assert_eq!(next(&mut event_rx).await, None);
        assert_eq!(task.await.unwrap(), ProducerStopReason::InputError);
    }

    #[tokio::test]
    async fn test_cancellation_stops_producer() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"a")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('a')));

        quit.fire();
        let reason = tokio::time::timeout(TIMEOUT, task).await.unwrap().unwrap();
        assert_eq!(reason, ProducerStopReason::Cancelled);

        let _unused = chunk_tx.send(data(b"b"));
        assert_eq!(next(&mut event_rx).await, None);
    }

    #[tokio::test]
    async fn test_quit_wins_over_pending_chunks() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);

        chunk_tx.send(data(b"abc")).unwrap();
        quit.fire();

        assert_eq!(producer.run().await, ProducerStopReason::Cancelled);
        assert_eq!(next(&mut event_rx).await, None);
    }

    #[tokio::test]
    async fn test_quit_unblocks_send_on_full_channel() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 1);
        let task = tokio::spawn(producer.run());

        // First event fills the channel, second send blocks.
        chunk_tx.send(data(b"ab")).unwrap();
        let_producer_run().await;

        quit.fire();
        let reason = tokio::time::timeout(TIMEOUT, task).await.unwrap().unwrap();
        assert_eq!(reason, ProducerStopReason::Cancelled);

        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('a')));
        assert_eq!(next(&mut event_rx).await, None);
    }

    #[tokio::test]
    async fn test_consumer_gone() {
        let Harness {
            chunk_tx,
            event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        drop(event_rx);

        chunk_tx.send(data(b"a")).unwrap();
        assert_eq!(producer.run().await, ProducerStopReason::ConsumerGone);
    }

    #[tokio::test]
    async fn test_small_channel_preserves_order() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 1);
        let _task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\x1b[Aok\r")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::ArrowUp)));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('o')));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('k')));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Key(Key::Enter)));
    }

    #[tokio::test]
    async fn test_invalid_byte_skipped() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let _task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\xffa")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('a')));
    }

    #[tokio::test]
    async fn test_invalid_byte_replaced() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::Replace, 8);
        let _task = tokio::spawn(producer.run());

        chunk_tx.send(data(b"\xffa")).unwrap();
        assert_eq!(
            next(&mut event_rx).await,
            Some(KeyEvent::Char(char::REPLACEMENT_CHARACTER))
        );
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('a')));
    }

    #[tokio::test]
    async fn test_pre_seeded_buffer_is_decoded_first() {
        let Harness {
            chunk_tx,
            mut event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let producer = producer.with_buffer(AccumulationBuffer::with_bytes(b"hi"));
        let _task = tokio::spawn(producer.run());

        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('h')));
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('i')));

        chunk_tx.send(data(b"!")).unwrap();
        assert_eq!(next(&mut event_rx).await, Some(KeyEvent::Char('!')));
    }

    #[tokio::test]
    async fn test_spawn_on_handle() {
        let Harness {
            chunk_tx,
            event_rx: _event_rx,
            quit: _quit,
            producer,
        } = harness(InvalidInputPolicy::SkipByte, 8);
        let task = spawn_event_producer(producer, &Handle::current());
        drop(chunk_tx);
        assert_eq!(task.await.unwrap(), ProducerStopReason::ReaderGone);
    }
}
