//! Logging setup, grounded on `tetra-core::debug`: `tracing` +
//! `tracing-subscriber` for stdout, `tracing-appender` for an optional
//! non-blocking verbose log file, a custom `FormatEvent` that right-pads
//! the `level file:line:` prefix, and a `std::sync::Once` guard so a
//! repeated call (e.g. from multiple unit tests in one binary) doesn't
//! panic on double-init.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt as tracingfmt, EnvFilter};

struct AlignedFormatter;

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let (color, reset) = match *metadata.level() {
            tracing::Level::ERROR => ("\x1b[31m", "\x1b[0m"),
            tracing::Level::WARN => ("\x1b[33m", "\x1b[0m"),
            tracing::Level::INFO => ("\x1b[32m", "\x1b[0m"),
            tracing::Level::DEBUG => ("\x1b[34m", "\x1b[0m"),
            tracing::Level::TRACE => ("\x1b[35m", "\x1b[0m"),
        };
        let location = format!(
            "{}{:<5}{} {}:{}:",
            color,
            metadata.level(),
            reset,
            metadata.file().unwrap_or("unknown"),
            metadata.line().unwrap_or(0)
        );
        write!(writer, "{:<width$} ", location, width = 60)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

static INIT_LOG: Once = Once::new();

/// Default filter: `info` everywhere, with the noisiest leaf modules
/// (IE codec, Q.921 idle polling) dialed down.
pub fn get_default_stdout_filter() -> EnvFilter {
    EnvFilter::new("info")
        .add_directive("pri_ie=debug".parse().unwrap())
        .add_directive("pri_engine::q921=info".parse().unwrap())
        .add_directive("pri_engine::q931=debug".parse().unwrap())
        .add_directive("pri_rose=debug".parse().unwrap())
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("trace")
}

/// Sets up maximum-verbosity logging, mainly for unit tests.
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and, optionally, a verbose log file.
/// Returns a guard that must be kept alive for file logging to keep
/// flushing.
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    if let Some((outfile, outfile_filter)) = outfile {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(outfile)
            .expect("failed to open log file");
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        let mut result = None;
        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer().event_format(AlignedFormatter).with_writer(file_writer).with_ansi(false);
            let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);
            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
            result = Some(guard);
        });
        result
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);
            tracing_subscriber::registry().with(stdout_layer.with_filter(stdout_filter)).init();
        });
        None
    }
}
