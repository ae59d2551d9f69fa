// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The concurrent half of the pipeline: reader thread, producer task, and the pieces
//! they share.
//!
//! ```text
//! device ─▶ ReadinessSource ─▶ InputReader ─RawChunk─▶ EventProducer ─KeyEvent─▶ KeyEvents
//!                 ▲            (std::thread)             (tokio task)
//!                 │                 ▲                         ▲
//!          ReadinessWaker ◀─────────┴──── QuitSignal ─────────┘
//! ```

// Attach sources.
pub mod buffer;
pub mod channel_types;
pub mod key_events;
pub mod producer_task;
pub mod quit_signal;
pub mod reader_thread;
pub mod readiness;

// Re-export.
pub use buffer::*;
pub use channel_types::*;
pub use key_events::*;
pub use producer_task::*;
pub use quit_signal::*;
pub use reader_thread::*;
pub use readiness::*;
