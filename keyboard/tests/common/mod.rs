// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! In-memory [`TerminalPlatform`] for driving a whole [`Console`] without a tty.
//!
//! ```text
//! test ──feed()──▶ shared queue ◀──read()── reader thread
//!   └───ping────▶ std mpsc ◀──recv()─── wait_for_readiness()
//!                     ▲
//!  QuitSignal ──wake()┘
//! ```
//!
//! [`Console`]: r3bl_keyboard::Console

#![allow(dead_code)]

use r3bl_keyboard::{ArmedInput, ReadinessSource, ReadinessWaker, SetupError,
                    TerminalPlatform};
use std::{collections::VecDeque,
          io::{self, ErrorKind, Read},
          sync::{Arc, Mutex, mpsc}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeAttributes {
    pub raw: bool,
}

#[derive(Debug)]
enum Step {
    Data(Vec<u8>),
    Fail(ErrorKind),
}

#[derive(Debug, Default)]
pub struct Failures {
    pub get_attributes: bool,
    pub set_raw_attributes: bool,
    pub arm: bool,
}

/// Test-side handle: feeds input and inspects what the console did to the "terminal".
#[derive(Debug, Clone)]
pub struct FakeTerminal {
    queue: Arc<Mutex<VecDeque<Step>>>,
    ping_tx: mpsc::Sender<()>,
    applied: Arc<Mutex<Vec<FakeAttributes>>>,
}

impl FakeTerminal {
    pub fn feed(&self, bytes: &[u8]) { self.push(Step::Data(bytes.to_vec())); }

    pub fn feed_error(&self, kind: ErrorKind) { self.push(Step::Fail(kind)); }

    /// Every attribute set applied, in order.
    pub fn applied_attributes(&self) -> Vec<FakeAttributes> {
        self.applied.lock().unwrap().clone()
    }

    fn push(&self, step: Step) {
        self.queue.lock().unwrap().push_back(step);
        self.ping_tx.send(()).unwrap();
    }
}

pub struct FakePlatform {
    queue: Arc<Mutex<VecDeque<Step>>>,
    ping_tx: mpsc::Sender<()>,
    ping_rx: Option<mpsc::Receiver<()>>,
    applied: Arc<Mutex<Vec<FakeAttributes>>>,
    failures: Failures,
}

pub fn fake_platform(failures: Failures) -> (FakePlatform, FakeTerminal) {
    let (ping_tx, ping_rx) = mpsc::channel();
    let queue = Arc::new(Mutex::new(VecDeque::new()));
    let applied = Arc::new(Mutex::new(vec![]));
    let terminal = FakeTerminal {
        queue: Arc::clone(&queue),
        ping_tx: ping_tx.clone(),
        applied: Arc::clone(&applied),
    };
    let platform = FakePlatform {
        queue,
        ping_tx,
        ping_rx: Some(ping_rx),
        applied,
        failures,
    };
    (platform, terminal)
}

pub struct FakeDevice {
    queue: Arc<Mutex<VecDeque<Step>>>,
}

impl Read for FakeDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut queue = self.queue.lock().unwrap();
        match queue.pop_front() {
            None => Err(ErrorKind::WouldBlock.into()),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Some(Step::Data(mut bytes)) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                if len < bytes.len() {
                    queue.push_front(Step::Data(bytes.split_off(len)));
                }
                Ok(len)
            }
        }
    }
}

pub struct FakeReadiness {
    ping_rx: mpsc::Receiver<()>,
}

impl ReadinessSource for FakeReadiness {
    fn wait_for_readiness(&mut self) -> io::Result<()> {
        self.ping_rx
            .recv()
            .map_err(|_| io::Error::new(ErrorKind::BrokenPipe, "pinger gone"))
    }
}

#[derive(Debug)]
pub struct FakeWaker {
    ping_tx: mpsc::Sender<()>,
}

impl ReadinessWaker for FakeWaker {
    fn wake(&self) { drop(self.ping_tx.send(())); }
}

impl TerminalPlatform for FakePlatform {
    type Attributes = FakeAttributes;
    type Device = FakeDevice;
    type Readiness = FakeReadiness;

    fn get_attributes(&self) -> io::Result<FakeAttributes> {
        if self.failures.get_attributes {
            return Err(io::Error::from(ErrorKind::Unsupported));
        }
        Ok(FakeAttributes { raw: false })
    }

    fn set_attributes(&self, attributes: &FakeAttributes) -> io::Result<()> {
        if attributes.raw && self.failures.set_raw_attributes {
            return Err(io::Error::from(ErrorKind::PermissionDenied));
        }
        self.applied.lock().unwrap().push(*attributes);
        Ok(())
    }

    fn make_raw(&self, _original: &FakeAttributes) -> FakeAttributes {
        FakeAttributes { raw: true }
    }

    fn arm_async_notify(
        &mut self,
    ) -> Result<ArmedInput<FakeDevice, FakeReadiness>, SetupError> {
        let ping_rx = self.ping_rx.take().filter(|_| !self.failures.arm).ok_or_else(|| {
            SetupError::AsyncIoSetup {
                stage: "register read descriptor",
                source: io::Error::from(ErrorKind::Other),
            }
        })?;
        Ok(ArmedInput {
            device: FakeDevice {
                queue: Arc::clone(&self.queue),
            },
            readiness: FakeReadiness { ping_rx },
            waker: Arc::new(FakeWaker {
                ping_tx: self.ping_tx.clone(),
            }),
        })
    }
}
