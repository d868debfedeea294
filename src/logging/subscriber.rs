//! Tracing subscriber setup: console formatter and initialisation.
use std::io::IsTerminal as _;

use super::{FILTER_ENV, STAGE_TARGET};

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits bashgen-style
/// console output, with or without ANSI colours.
#[derive(Debug, Clone, Copy)]
pub(super) struct ConsoleFormatter {
    color: bool,
}

impl ConsoleFormatter {
    /// Formatter without escape sequences.
    pub(super) const fn plain() -> Self {
        Self { color: false }
    }

    /// Coloured formatter, unless `NO_COLOR` is set or stderr is redirected.
    fn detect() -> Self {
        let color = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        Self { color }
    }

    fn paint<'a>(self, code: &str, text: &'a str) -> std::borrow::Cow<'a, str> {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m").into()
        } else {
            text.into()
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        match level {
            tracing::Level::ERROR => writeln!(writer, "{} {msg}", self.paint("31", "ERROR")),
            tracing::Level::WARN => writeln!(writer, "{}  {msg}", self.paint("33", "WARN")),
            tracing::Level::INFO if target == STAGE_TARGET => {
                writeln!(writer, "{} {}", self.paint("1;34", "==>"), self.paint("1", msg))
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  {}", self.paint("2", msg)),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Events go to standard error only, so that generated scripts printed to
/// standard output stay clean. The console shows `info` and above, or
/// `debug` with `verbose`; `BASHGEN_LOG` overrides both. Must be called once
/// at program startup, before any logging.
pub fn init_subscriber(verbose: bool) {
    use tracing_subscriber::{
        EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter::detect())
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::capture;

    #[test]
    fn plain_formatter_levels() {
        let out = capture(|| {
            tracing::error!("broken");
            tracing::warn!("careful");
            tracing::info!(target: STAGE_TARGET, "Generating");
            tracing::info!("written");
            tracing::debug!("details");
        });
        assert_eq!(
            out,
            "ERROR broken\nWARN  careful\n==> Generating\n  written\n  details\n"
        );
    }

    #[test]
    fn paint_only_when_coloured() {
        let plain = ConsoleFormatter::plain();
        assert_eq!(plain.paint("31", "x"), "x");
        let color = ConsoleFormatter { color: true };
        assert_eq!(color.paint("31", "x"), "\x1b[31mx\x1b[0m");
    }
}
