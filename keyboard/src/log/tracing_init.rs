// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DisplayPreference, TracingConfig, WriterConfig};
use miette::IntoDiagnostic as _;
use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, Registry, layer::SubscriberExt as _, registry::LookupSpan,
                         util::SubscriberInitExt as _};

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Installs the global subscriber. Does nothing if `tracing_config` writes nowhere.
///
/// # Errors
///
/// If the log file can't be created, or a global subscriber is already installed.
pub fn try_initialize_logging_global(tracing_config: &TracingConfig) -> miette::Result<()> {
    if !tracing_config.is_enabled() {
        return Ok(());
    }
    let layers = try_create_layers(tracing_config)?;
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .into_diagnostic()
}

/// Installs the subscriber for the current thread only, until the guard is dropped.
/// Meant for tests.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_initialize_logging_thread_local(
    tracing_config: &TracingConfig,
) -> miette::Result<DefaultGuard> {
    let layers = try_create_layers(tracing_config)?;
    Ok(tracing_subscriber::registry().with(layers).set_default())
}

/// Returns the layers without installing them. The first layer is the level filter.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<Registry>>>> {
    let level_filter = tracing_config.level_filter;
    let mut layers: Vec<Box<DynLayer<Registry>>> = vec![Box::new(level_filter)];

    if let Some(layer) =
        try_create_display_layer(level_filter, &tracing_config.writer_config)
    {
        layers.push(layer);
    }
    if let Some(layer) = try_create_file_layer(level_filter, &tracing_config.writer_config)? {
        layers.push(layer);
    }

    Ok(layers)
}

pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: &WriterConfig,
) -> Option<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = tracing_subscriber::fmt::layer().with_thread_names(true);

    match writer_config {
        WriterConfig::Display(display_pref)
        | WriterConfig::DisplayAndFile(display_pref, _) => match display_pref {
            DisplayPreference::Stdout => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stdout)
                    .with_filter(level_filter),
            )),
            DisplayPreference::Stderr => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stderr)
                    .with_filter(level_filter),
            )),
        },
        WriterConfig::None | WriterConfig::File(_) => None,
    }
}

/// # Errors
///
/// If the log file's directory or name can't be determined.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: &WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    match writer_config {
        WriterConfig::File(path) | WriterConfig::DisplayAndFile(_, path) => {
            let file_appender = try_create_file_appender(path)?;
            Ok(Some(Box::new(
                tracing_subscriber::fmt::layer()
                    .with_thread_names(true)
                    .with_ansi(false)
                    .with_writer(file_appender)
                    .with_filter(level_filter),
            )))
        }
        WriterConfig::None | WriterConfig::Display(_) => Ok(None),
    }
}

/// Don't wrap this in `tracing_appender::non_blocking()`. The worker guard would have to
/// outlive the subscriber, which a global subscriber never lets go of.
fn try_create_file_appender(
    path: &Path,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Log file path {} has no file name", path.display())
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(tracing_appender::rolling::never(parent, file_name))
}
