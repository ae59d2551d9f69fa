// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fire-once cancellation broadcast shared by the reader thread and the producer task.
//!
//! ```text
//! QuitSignal::fire()
//!   │
//!   ├──▶ watch channel flips to `true`
//!   │      ├──▶ QuitListener::is_fired()   (reader thread, sync check)
//!   │      └──▶ QuitListener::fired().await (producer task, select! branch)
//!   │
//!   └──▶ ReadinessWaker::wake()  unblocks the reader's readiness wait
//! ```
//!
//! A plain [`tokio::sync::watch`] covers both observers, since its receiver can be
//! checked synchronously from a non-async thread. The wakers cover the one thing the
//! watch channel cannot do: interrupt a thread that is blocked in the kernel.

use super::ReadinessWaker;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Owner side of the cancellation signal. Held by the [`Console`].
///
/// [`Console`]: crate::Console
#[derive(Debug)]
pub struct QuitSignal {
    sender: watch::Sender<bool>,
    wakers: Mutex<Vec<Arc<dyn ReadinessWaker>>>,
}

impl Default for QuitSignal {
    fn default() -> Self { Self::new() }
}

impl QuitSignal {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender,
            wakers: Mutex::new(Vec::new()),
        }
    }

    /// A new observer. Listeners created after [`fire()`] see it as already fired.
    ///
    /// [`fire()`]: Self::fire
    #[must_use]
    pub fn listener(&self) -> QuitListener {
        QuitListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Registers a waker to be woken on [`fire()`]. If the signal has already fired,
    /// the waker is woken right away.
    ///
    /// [`fire()`]: Self::fire
    pub fn register_waker(&self, waker: Arc<dyn ReadinessWaker>) {
        // Check under the lock so a concurrent fire() can't slip between check and push.
        let Ok(mut wakers) = self.wakers.lock() else {
            waker.wake();
            return;
        };
        if self.is_fired() {
            waker.wake();
        } else {
            wakers.push(waker);
        }
    }

    /// Fires the signal. Only the first call has an effect; returns whether this call
    /// was the one that fired it.
    pub fn fire(&self) -> bool {
        let fired_now = self.sender.send_if_modified(|quit| {
            let was_fired = *quit;
            *quit = true;
            !was_fired
        });

        if fired_now {
            // Flag first, then wake: a woken reader must observe the flag.
            if let Ok(wakers) = self.wakers.lock() {
                for waker in wakers.iter() {
                    waker.wake();
                }
            }
        }

        fired_now
    }

    #[must_use]
    pub fn is_fired(&self) -> bool { *self.sender.borrow() }
}

/// Observer side of the cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QuitListener {
    receiver: watch::Receiver<bool>,
}

impl QuitListener {
    /// Non-blocking check, usable from a plain thread.
    #[must_use]
    pub fn is_fired(&self) -> bool { *self.receiver.borrow() }

    /// Resolves once the signal has fired. Also resolves if the [`QuitSignal`] is
    /// dropped without firing, since nothing can fire it any more and the pipeline is
    /// being torn down anyway.
    ///
    /// Cancel safe, so it can sit in a [`tokio::select!`] branch.
    pub async fn fired(&mut self) { drop(self.receiver.wait_for(|quit| *quit).await); }
}
