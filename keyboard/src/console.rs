// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`Console`]: raw mode plus the running input pipeline, as one scoped resource.
//!
//! # Lifecycle
//!
//! ```text
//! Console::open()                                  Console::close() / drop
//! ───────────────                                  ───────────────────────
//! 1. capture tokio runtime handle                  1. fire QuitSignal (wakes reader)
//! 2. get_attributes()  → save original             2. restore original attributes
//! 3. make_raw()                                    3. join reader thread
//! 4. arm_async_notify() (non-blocking + readiness) 4. drop platform (closes write side)
//! 5. set_attributes(raw)
//! 6. spawn reader thread
//! 7. spawn producer task
//! ```
//!
//! If any open step fails, everything acquired so far is dropped and the terminal is
//! left as it was. The release path runs exactly once, whichever of [`close()`] or
//! [`Drop`] gets there first. Release errors are logged, never returned.
//!
//! [`close()`]: Console::close

use crate::{ArmedInput, ConsoleConfig, EventProducer, InputReader, KeyEvent, KeyEvents,
            ProducerStopReason, QuitSignal, ReaderStopReason, SetupError,
            TerminalPlatform, TtyPlatform, key_event_channel, raw_chunk_channel,
            spawn_event_producer, spawn_reader_thread};
use tokio::runtime::Handle;

/// A terminal in raw mode whose key presses arrive as [`KeyEvent`]s.
///
/// Must be opened from inside a tokio runtime, which runs the producer task.
///
/// ```no_run
/// # use r3bl_keyboard::{Console, ConsoleConfig, Key, KeyEvent};
/// # async fn demo() -> miette::Result<()> {
/// let mut console = Console::open(ConsoleConfig::from_env())?;
/// while let Some(event) = console.next_event().await {
///     if event == KeyEvent::Key(Key::Ctrl('c')) {
///         break;
///     }
/// }
/// console.close();
/// # Ok(())
/// # }
/// ```
#[allow(missing_debug_implementations)]
pub struct Console<P: TerminalPlatform = TtyPlatform> {
    platform: P,
    original_attributes: P::Attributes,
    quit: QuitSignal,
    reader_thread: Option<std::thread::JoinHandle<ReaderStopReason>>,
    producer_task: tokio::task::JoinHandle<ProducerStopReason>,
    events: KeyEvents,
    is_open: bool,
}

impl Console<TtyPlatform> {
    /// Opens [`ConsoleConfig::device_path`] and puts it into raw mode.
    ///
    /// # Errors
    ///
    /// See [`SetupError`]. Nothing is left modified on failure.
    pub fn open(config: ConsoleConfig) -> Result<Self, SetupError> {
        let platform = TtyPlatform::open(&config.device_path)?;
        Self::open_with(platform, config)
    }
}

impl<P: TerminalPlatform> Console<P> {
    /// Same as [`Console::open()`] for any [`TerminalPlatform`].
    /// [`ConsoleConfig::device_path`] is ignored, since `platform` is already open.
    ///
    /// # Errors
    ///
    /// See [`SetupError`]. Nothing is left modified on failure.
    pub fn open_with(mut platform: P, config: ConsoleConfig) -> Result<Self, SetupError> {
        let runtime = Handle::try_current().map_err(SetupError::NoRuntime)?;

        let original_attributes =
            platform
                .get_attributes()
                .map_err(|source| SetupError::TerminalConfig {
                    action: "query",
                    source,
                })?;
        let raw_attributes = platform.make_raw(&original_attributes);

        let ArmedInput {
            device,
            readiness,
            waker,
        } = platform.arm_async_notify()?;

        platform
            .set_attributes(&raw_attributes)
            .map_err(|source| SetupError::TerminalConfig {
                action: "apply",
                source,
            })?;

        let quit = QuitSignal::new();
        quit.register_waker(waker);

        let (chunk_tx, chunk_rx) = raw_chunk_channel();
        let (event_tx, event_rx) = key_event_channel(config.event_channel_capacity);

        let reader = InputReader::new(
            device,
            readiness,
            chunk_tx,
            quit.listener(),
            config.read_chunk_size,
        );
        let reader_thread = match spawn_reader_thread(reader) {
            Ok(handle) => handle,
            Err(source) => {
                restore_attributes(&platform, &original_attributes);
                return Err(SetupError::AsyncIoSetup {
                    stage: "spawn reader thread",
                    source,
                });
            }
        };

        let producer = EventProducer::new(
            chunk_rx,
            event_tx,
            quit.listener(),
            config.escape_table,
            config.invalid_input_policy,
        );
        let producer_task = spawn_event_producer(producer, &runtime);

        tracing::debug!(
            message = "console: opened",
            read_chunk_size = config.read_chunk_size,
            event_channel_capacity = config.event_channel_capacity,
            invalid_input_policy = ?config.invalid_input_policy
        );

        Ok(Self {
            platform,
            original_attributes,
            quit,
            reader_thread: Some(reader_thread),
            producer_task,
            events: KeyEvents::new(event_rx),
            is_open: true,
        })
    }

    /// The next key press. `None` once the sequence has ended: after an
    /// [`KeyEvent::Error`], or when the pipeline stopped for any other reason.
    ///
    /// Cancel safe.
    pub async fn next_event(&mut self) -> Option<KeyEvent> { self.events.next().await }

    /// Direct access to the event sequence, e.g. to use it as a [`Stream`].
    ///
    /// [`Stream`]: futures_core::Stream
    pub fn events_mut(&mut self) -> &mut KeyEvents { &mut self.events }

    #[must_use]
    pub fn is_open(&self) -> bool { self.is_open }

    /// Whether the producer task has stopped. Once it has, the event sequence has no
    /// more events beyond what is already buffered.
    #[must_use]
    pub fn is_pipeline_finished(&self) -> bool { self.producer_task.is_finished() }

    /// Stops the pipeline and restores the terminal. Same as dropping the console, but
    /// reads better at call sites.
    pub fn close(mut self) { self.release(); }

    fn release(&mut self) {
        if !self.is_open {
            return;
        }
        self.is_open = false;

        self.quit.fire();
        restore_attributes(&self.platform, &self.original_attributes);

        if let Some(reader_thread) = self.reader_thread.take() {
            match reader_thread.join() {
                Ok(reason) => {
                    tracing::debug!(message = "console: reader thread joined", ?reason);
                }
                Err(_) => tracing::warn!(message = "console: reader thread panicked"),
            }
        }

        tracing::debug!(message = "console: closed");
    }
}

impl<P: TerminalPlatform> Drop for Console<P> {
    fn drop(&mut self) { self.release(); }
}

fn restore_attributes<P: TerminalPlatform>(platform: &P, original: &P::Attributes) {
    if let Err(error) = platform.set_attributes(original) {
        tracing::warn!(
            message = "console: failed to restore terminal attributes",
            error = ?error
        );
    }
}
