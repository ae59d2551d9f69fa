// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::KeyEventReceiver;
use crate::KeyEvent;
use futures_core::Stream;
use std::{pin::Pin,
          task::{Context, Poll}};

/// The application's end of the pipeline: an ordered sequence of [`KeyEvent`]s.
///
/// Ends (yields `None`) once the producer task has stopped, which happens after an
/// [`KeyEvent::Error`], after the console is closed, or after cancellation. It can't be
/// restarted.
///
/// Can be consumed three ways:
/// - [`next()`] from async code.
/// - [`blocking_next()`] from a plain thread (panics inside a runtime, like
///   [`tokio::sync::mpsc::Receiver::blocking_recv()`]).
/// - As a [`Stream`].
///
/// [`blocking_next()`]: Self::blocking_next
/// [`next()`]: Self::next
#[derive(Debug)]
pub struct KeyEvents {
    event_rx: KeyEventReceiver,
}

impl KeyEvents {
    #[must_use]
    pub fn new(event_rx: KeyEventReceiver) -> Self { Self { event_rx } }

    /// Cancel safe.
    pub async fn next(&mut self) -> Option<KeyEvent> { self.event_rx.recv().await }

    pub fn blocking_next(&mut self) -> Option<KeyEvent> { self.event_rx.blocking_recv() }

    /// An event if one is already decoded, without waiting.
    pub fn try_next(&mut self) -> Option<KeyEvent> { self.event_rx.try_recv().ok() }
}

impl Stream for KeyEvents {
    type Item = KeyEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.event_rx.poll_recv(cx)
    }
}
