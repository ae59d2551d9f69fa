// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`tracing`] setup for binaries and tests. The library itself only emits events.

// Attach sources.
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
