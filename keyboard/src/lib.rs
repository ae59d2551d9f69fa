// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios keydump epoll kqueue

//! # r3bl_keyboard
//!
//! Single-keystroke input for terminal apps: no line buffering, no local echo, every key
//! press delivered as a typed [`KeyEvent`].
//!
//! ```text
//!  /dev/tty (raw mode, O_NONBLOCK)
//!      │
//!      │ readiness (mio: epoll / kqueue)
//!      ▼
//!  ┌────────────────┐  RawChunk  ┌─────────────────┐  KeyEvent  ┌──────────────┐
//!  │ reader thread  ├───────────▶│ producer task   ├───────────▶│ KeyEvents    │
//!  │ InputReader    │ unbounded  │ EventProducer   │  bounded   │ (your code)  │
//!  └────────────────┘            │ decode() loop   │            └──────────────┘
//!          ▲                     └─────────────────┘
//!          │                              ▲
//!          └──────── QuitSignal ──────────┘   fired by Console::close() / drop
//! ```
//!
//! # Layout
//!
//! | Module       | Contents                                                          |
//! | :----------- | :---------------------------------------------------------------- |
//! | [`keys`]     | [`Key`], [`KeyEvent`], [`EscapeTable`], the pure [`decode()`]     |
//! | [`input`]    | reader thread, producer task, channels, [`QuitSignal`], readiness |
//! | [`terminal`] | [`TerminalPlatform`] and the `/dev/tty` [`TtyPlatform`]           |
//! | [`console`]  | [`Console`]: open, consume events, close                          |
//! | [`config`]   | [`ConsoleConfig`], [`InvalidInputPolicy`]                         |
//! | [`log`]      | [`TracingConfig`] and subscriber setup                            |
//!
//! # Example
//!
//! ```no_run
//! use r3bl_keyboard::{Console, ConsoleConfig, Key, KeyEvent};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let mut console = Console::open(ConsoleConfig::from_env())?;
//!     while let Some(event) = console.next_event().await {
//!         match event {
//!             KeyEvent::Key(Key::Esc) => break,
//!             KeyEvent::Char(ch) => print!("{ch}"),
//!             KeyEvent::Key(key) => print!("<{key}>"),
//!             KeyEvent::Error(error) => return Err(miette::miette!("{error}")),
//!         }
//!     }
//!     console.close();
//!     Ok(())
//! }
//! ```
//!
//! Run `cargo run --bin keydump` to see what your terminal sends.

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod common;
pub mod config;
pub mod console;
pub mod error;
pub mod input;
pub mod keys;
pub mod log;
pub mod terminal;

// Re-export.
pub use common::*;
pub use config::*;
pub use console::*;
pub use error::*;
pub use input::*;
pub use keys::*;
pub use log::*;
pub use terminal::*;
