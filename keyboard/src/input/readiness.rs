// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words epoll kqueue wakeup eventfd

//! "Data may be available" notification for the terminal read descriptor.
//!
//! The [reader thread] only needs two capabilities, expressed as traits so the
//! reader/producer logic does not depend on how the OS delivers readiness (epoll,
//! kqueue, `SIGIO`, or a test double):
//!
//! | Trait                 | Held by              | Does                                        |
//! | :-------------------- | :------------------- | :------------------------------------------ |
//! | [`ReadinessSource`]   | reader thread        | blocks until data may be readable or woken  |
//! | [`ReadinessWaker`]    | [`QuitSignal`]       | unblocks a pending wait, from any thread    |
//!
//! The production pair is [`MioReadinessSource`] + [`MioReadinessWaker`], created
//! together from one [`mio::Poll`] so the waker is registered with the same poll that
//! watches the device:
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ mio::Poll (epoll on Linux, kqueue on mac) │
//! │   • Token 0: tty read fd   (READABLE)     │◀── kernel: bytes arrived
//! │   • Token 1: mio::Waker                   │◀── QuitSignal::fire()
//! └───────────────────────────────────────────┘
//! ```
//!
//! [`mio`] is edge-triggered, which is why the reader drains the device until it
//! reports [`WouldBlock`] before waiting again.
//!
//! [`QuitSignal`]: crate::QuitSignal
//! [`WouldBlock`]: std::io::ErrorKind::WouldBlock
//! [reader thread]: crate::InputReader

use crate::SetupError;
use mio::{Events, Interest, Poll, Token, Waker, unix::SourceFd};
use std::{fmt::Debug,
          io,
          os::fd::RawFd};

/// Capacity for the [`mio::Events`] buffer. Two sources, so two is plenty.
const EVENTS_CAPACITY: usize = 2;

const DEVICE_TOKEN: Token = Token(0);
const WAKER_TOKEN: Token = Token(1);

/// Something the reader thread can block on until the device may have data.
///
/// Spurious returns are allowed: the reader re-checks the quit signal and then simply
/// gets [`WouldBlock`] from the device.
///
/// [`WouldBlock`]: std::io::ErrorKind::WouldBlock
pub trait ReadinessSource: Send + 'static {
    /// Blocks until the device may be readable, or until the paired
    /// [`ReadinessWaker`] is woken.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::Interrupted`] is retried by the caller. Anything else ends the
    /// input stream.
    fn wait_for_readiness(&mut self) -> io::Result<()>;
}

/// Unblocks a pending [`ReadinessSource::wait_for_readiness()`]. Safe to call from any
/// thread, any number of times, including after the source is gone.
pub trait ReadinessWaker: Debug + Send + Sync + 'static {
    fn wake(&self);
}

/// [`ReadinessSource`] backed by [`mio::Poll`].
#[allow(missing_debug_implementations)]
pub struct MioReadinessSource {
    poll_handle: Poll,
    ready_events_buffer: Events,
}

impl MioReadinessSource {
    /// Creates the poll, its waker, and registers `fd` for readability.
    ///
    /// `fd` must stay open for as long as the returned source is used. The caller keeps
    /// both in the reader thread, which drops them together.
    ///
    /// # Errors
    ///
    /// [`SetupError::AsyncIoSetup`] naming the stage that failed.
    pub fn register(fd: RawFd) -> Result<(Self, MioReadinessWaker), SetupError> {
        let poll_handle = Poll::new().map_err(|source| SetupError::AsyncIoSetup {
            stage: "create poll",
            source,
        })?;

        // Waker must come from the same registry as the device.
        let waker = Waker::new(poll_handle.registry(), WAKER_TOKEN).map_err(|source| {
            SetupError::AsyncIoSetup {
                stage: "create waker",
                source,
            }
        })?;

        poll_handle
            .registry()
            .register(&mut SourceFd(&fd), DEVICE_TOKEN, Interest::READABLE)
            .map_err(|source| SetupError::AsyncIoSetup {
                stage: "register read descriptor",
                source,
            })?;

        let source = Self {
            poll_handle,
            ready_events_buffer: Events::with_capacity(EVENTS_CAPACITY),
        };
        Ok((source, MioReadinessWaker(waker)))
    }
}

impl ReadinessSource for MioReadinessSource {
    fn wait_for_readiness(&mut self) -> io::Result<()> {
        self.poll_handle.poll(&mut self.ready_events_buffer, None)
    }
}

/// Newtype wrapping [`mio::Waker`] to implement [`ReadinessWaker`].
#[derive(Debug)]
pub struct MioReadinessWaker(pub Waker);

impl ReadinessWaker for MioReadinessWaker {
    /// The result is discarded: if the poll is already gone (thread exited), the wake
    /// has nothing to do.
    fn wake(&self) { let _unused = self.0.wake(); }
}
