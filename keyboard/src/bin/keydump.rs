// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words keydump

//! Prints every key press the terminal sends, decoded, until `q` or `Ctrl+C`.
//!
//! ```text
//! $ cargo run --bin keydump -- --log-file /tmp/keydump.log
//! ```

use clap::{Parser, ValueEnum};
use r3bl_keyboard::{Console, ConsoleConfig, EscapeTable, InvalidInputPolicy, Key,
                    KeyEvent, TracingConfig, try_initialize_logging_global};
use std::{io::Write as _, path::PathBuf};
use tracing_core::LevelFilter;

#[derive(Debug, Parser)]
#[command(bin_name = "keydump")]
#[command(about = "⌨️  Show what your terminal sends for each key press")]
#[command(version)]
#[command(next_line_help = true)]
pub struct CLIArg {
    #[arg(long, short = 'd', default_value = "/dev/tty", help = "Terminal device to read")]
    pub device: PathBuf,

    #[arg(
        long,
        short = 't',
        help = "Terminal name used to pick the escape table [default: $TERM]"
    )]
    pub term: Option<String>,

    #[arg(long, default_value_t = r3bl_keyboard::DEFAULT_READ_CHUNK_SIZE)]
    pub read_chunk_size: usize,

    #[arg(long, default_value_t = r3bl_keyboard::DEFAULT_EVENT_CHANNEL_CAPACITY)]
    pub event_channel_capacity: usize,

    #[arg(long, value_enum, default_value_t = InvalidInputArg::Skip)]
    pub invalid_input: InvalidInputArg,

    #[arg(
        long,
        short = 'l',
        help = "Log to this file. Logs never go to the terminal, it's in raw mode"
    )]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InvalidInputArg {
    /// Drop bytes that are not valid UTF-8.
    Skip,
    /// Show bytes that are not valid UTF-8 as U+FFFD.
    Replace,
}

impl From<InvalidInputArg> for InvalidInputPolicy {
    fn from(arg: InvalidInputArg) -> Self {
        match arg {
            InvalidInputArg::Skip => Self::SkipByte,
            InvalidInputArg::Replace => Self::Replace,
        }
    }
}

impl CLIArg {
    fn console_config(&self) -> ConsoleConfig {
        let config = ConsoleConfig::from_env()
            .with_device_path(&self.device)
            .with_read_chunk_size(self.read_chunk_size)
            .with_event_channel_capacity(self.event_channel_capacity)
            .with_invalid_input_policy(self.invalid_input.into());
        match &self.term {
            Some(term) => config.with_escape_table(EscapeTable::for_terminal(term)),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli_arg = CLIArg::parse();

    if let Some(log_file) = &cli_arg.log_file {
        try_initialize_logging_global(
            &TracingConfig::new_file(Some(log_file.clone()))
                .with_level_filter(LevelFilter::DEBUG),
        )?;
        // % is Display, ? is Debug.
        tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
    }

    let mut console = Console::open(cli_arg.console_config())?;
    print_line("Press keys to see them decoded. `q` or Ctrl+C quits.");

    loop {
        let maybe_event = tokio::select! {
            maybe_event = console.next_event() => maybe_event,
            // ISIG is off in raw mode, so this only fires for an external `kill -INT`.
            _ = tokio::signal::ctrl_c() => break,
        };

        match maybe_event {
            None => break,
            Some(KeyEvent::Char('q') | KeyEvent::Key(Key::Ctrl('c'))) => break,
            Some(KeyEvent::Error(error)) => {
                console.close();
                return Err(miette::miette!("{error}"));
            }
            Some(event) => print_line(&describe(&event)),
        }
    }

    console.close();
    tracing::debug!(message = "Stop logging...");
    Ok(())
}

fn describe(event: &KeyEvent) -> String {
    match event {
        KeyEvent::Char(ch) => format!("char  {ch:?}  U+{:04X}", u32::from(*ch)),
        KeyEvent::Key(key) => format!("key   {key}"),
        KeyEvent::Error(error) => format!("error {error}"),
    }
}

/// Raw mode leaves output processing on, but stdout may be a different device than
/// the one in raw mode, so always flush.
fn print_line(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _unused = writeln!(stdout, "{text}");
    let _unused = stdout.flush();
}
