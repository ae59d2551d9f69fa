// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;
use tracing_core::LevelFilter;

/// Default log file, relative to the current directory.
pub const DEFAULT_LOG_FILE: &str = "keyboard_log.log";

/// Where logs go, and how much of them.
///
/// While a [`Console`] is open the terminal is in raw mode and `\n` does not return the
/// cursor to column 0 for the logs, so prefer [`WriterConfig::File`] for anything that
/// runs interactively.
///
/// [`Console`]: crate::Console
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(PathBuf),
    DisplayAndFile(DisplayPreference, PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    /// `DEBUG` level logs to `file` (or [`DEFAULT_LOG_FILE`]).
    #[must_use]
    pub fn new_file(file: Option<PathBuf>) -> Self {
        Self {
            writer_config: WriterConfig::File(
                file.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            ),
            level_filter: LevelFilter::DEBUG,
        }
    }

    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer_config != WriterConfig::None && self.level_filter != LevelFilter::OFF
    }
}
