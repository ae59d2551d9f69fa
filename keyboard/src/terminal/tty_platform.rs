// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios IGNBRK BRKINT PARMRK ISTRIP INLCR IGNCR ICRNL IXON ECHONL ICANON
// cspell:words ISIG IEXTEN CSIZE PARENB VMIN VTIME getfl setfl

//! Unix terminal device implementation using rustix's safe termios and fcntl APIs.
//!
//! The device is opened twice, so the two halves have independent lifetimes:
//!
//! | Descriptor | Flags              | Used for                          | Closed by            |
//! | :--------- | :----------------- | :-------------------------------- | :------------------- |
//! | read       | `O_RDONLY`, NONBLOCK | reader thread's `read()` calls  | reader thread exit   |
//! | write      | `O_WRONLY`         | `tcgetattr()` / `tcsetattr()`     | dropping the platform |
//!
//! Attributes belong to the terminal, not the descriptor, so setting them on the write
//! side affects the read side too. This keeps attribute restoration possible after the
//! reader thread (and its descriptor) is gone.

use super::{ArmedInput, TerminalPlatform};
use crate::{MioReadinessSource, SetupError};
use rustix::{fs::{OFlags, fcntl_getfl, fcntl_setfl},
             termios::{self, ControlModes, InputModes, LocalModes, OptionalActions,
                       SpecialCodeIndex, Termios}};
use std::{fs::File,
          io,
          os::fd::AsRawFd as _,
          path::Path,
          sync::Arc};

/// A terminal device such as `/dev/tty` or a PTY slave.
#[derive(Debug)]
pub struct TtyPlatform {
    /// `None` once [`arm_async_notify()`] has handed it to the reader thread.
    ///
    /// [`arm_async_notify()`]: TerminalPlatform::arm_async_notify
    read_half: Option<File>,
    write_half: File,
}

impl TtyPlatform {
    /// Opens `path` once for reading and once for writing.
    ///
    /// # Errors
    ///
    /// [`SetupError::Device`] if either open fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let device_error = |source| SetupError::Device {
            path: path.to_path_buf(),
            source,
        };

        let read_half = File::options()
            .read(true)
            .open(path)
            .map_err(device_error)?;
        let write_half = File::options()
            .write(true)
            .open(path)
            .map_err(device_error)?;

        tracing::debug!(message = "tty-platform: opened", path = %path.display());

        Ok(Self {
            read_half: Some(read_half),
            write_half,
        })
    }

    /// Whether the device is a terminal at all.
    #[must_use]
    pub fn is_terminal(&self) -> bool { termios::isatty(&self.write_half) }
}

impl TerminalPlatform for TtyPlatform {
    type Attributes = Termios;
    type Device = File;
    type Readiness = MioReadinessSource;

    fn get_attributes(&self) -> io::Result<Termios> {
        Ok(termios::tcgetattr(&self.write_half)?)
    }

    fn set_attributes(&self, attributes: &Termios) -> io::Result<()> {
        Ok(termios::tcsetattr(
            &self.write_half,
            OptionalActions::Now,
            attributes,
        )?)
    }

    fn make_raw(&self, original: &Termios) -> Termios { raw_attributes(original) }

    fn arm_async_notify(&mut self) -> Result<ArmedInput<File, MioReadinessSource>, SetupError> {
        let read_half = self.read_half.take().ok_or_else(|| SetupError::AsyncIoSetup {
            stage: "take read descriptor",
            source: io::Error::other("read descriptor already armed"),
        })?;

        let flags = fcntl_getfl(&read_half).map_err(|errno| SetupError::AsyncIoSetup {
            stage: "get descriptor flags",
            source: errno.into(),
        })?;
        fcntl_setfl(&read_half, flags | OFlags::NONBLOCK).map_err(|errno| {
            SetupError::AsyncIoSetup {
                stage: "set non-blocking",
                source: errno.into(),
            }
        })?;

        let (readiness, waker) = MioReadinessSource::register(read_half.as_raw_fd())?;

        Ok(ArmedInput {
            device: read_half,
            readiness,
            waker: Arc::new(waker),
        })
    }
}

/// Clears exactly the flags raw keyboard input needs cleared, leaving output processing
/// (`OPOST`) alone so `\n` still moves to column 0 for anything the application prints.
#[must_use]
pub fn raw_attributes(original: &Termios) -> Termios {
    let mut raw = original.clone();

    raw.input_modes.remove(
        InputModes::IGNBRK
            | InputModes::BRKINT
            | InputModes::PARMRK
            | InputModes::ISTRIP
            | InputModes::INLCR
            | InputModes::IGNCR
            | InputModes::ICRNL
            | InputModes::IXON,
    );
    raw.local_modes.remove(
        LocalModes::ECHO
            | LocalModes::ECHONL
            | LocalModes::ICANON
            | LocalModes::ISIG
            | LocalModes::IEXTEN,
    );
    raw.control_modes
        .remove(ControlModes::CSIZE | ControlModes::PARENB);
    raw.control_modes.insert(ControlModes::CS8);

    // Block until at least one byte, no inter-byte timer.
    raw.special_codes[SpecialCodeIndex::VMIN] = 1;
    raw.special_codes[SpecialCodeIndex::VTIME] = 0;

    raw
}
