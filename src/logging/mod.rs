//! Logging infrastructure for console diagnostics.
//!
//! Generated text goes to standard output; everything logged here goes to
//! standard error through a [`tracing`] subscriber.

mod logger;
mod subscriber;

pub use logger::Logger;
pub use subscriber::init_subscriber;

/// Target used for stage headers.
pub const STAGE_TARGET: &str = "bashgen::stage";

/// Environment variable overriding the console filter, in `EnvFilter` syntax.
pub const FILTER_ENV: &str = "BASHGEN_LOG";

/// Run `f` with a thread-local subscriber that renders events with the
/// console formatter into a buffer, and return what was written.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn capture(f: impl FnOnce()) -> String {
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt as _;

    #[derive(Clone)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("sink lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Sink(Arc::clone(&buffer));
    let layer = tracing_subscriber::fmt::layer()
        .event_format(subscriber::ConsoleFormatter::plain())
        .with_writer(move || sink.clone());
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.lock().expect("sink lock").clone();
    String::from_utf8(bytes).expect("utf-8 log output")
}
