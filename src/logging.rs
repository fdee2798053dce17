//! Console logging.
//!
//! Every line goes through `tracing` and is printed as `[LEVEL] message`.
//! An info event with `success = true` is printed as `[SUCCESS]`.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

pub struct ConsoleFormat;

#[derive(Default)]
struct LineVisitor {
    message: String,
    extra: String,
    success: bool,
}

impl Visit for LineVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "success" {
            self.success = value;
        } else {
            let _ = write!(self.extra, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.extra, " {}={:?}", field.name(), value);
        }
    }
}

fn tag(level: &Level, success: bool) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO if success => "SUCCESS",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        writeln!(
            writer,
            "[{}] {}{}",
            tag(event.metadata().level(), visitor.success),
            visitor.message,
            visitor.extra
        )
    }
}

/// Install the stdout subscriber. `RUST_LOG` overrides the default `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ConsoleFormat)
        .with_writer(std::io::stdout)
        .init();
}

#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::ConsoleFormat;

    #[derive(Clone, Default)]
    pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with console logging redirected into a buffer; returns the
    /// closure's result and the printed lines.
    pub fn logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .event_format(ConsoleFormat)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        (out, text.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::capture::logs;

    #[test]
    fn test_level_tags() {
        let ((), lines) = logs(|| {
            tracing::info!("No TCP ports to plot for x");
            tracing::warn!("careful");
            tracing::error!("The folder 'nope' does not exist.");
            tracing::info!(success = true, "Plot saved to plots/x.png");
        });
        assert_eq!(
            lines,
            vec![
                "[INFO] No TCP ports to plot for x",
                "[WARNING] careful",
                "[ERROR] The folder 'nope' does not exist.",
                "[SUCCESS] Plot saved to plots/x.png",
            ]
        );
    }

    #[test]
    fn test_extra_fields_appended() {
        let ((), lines) = logs(|| tracing::info!(charts = 3, "done"));
        assert_eq!(lines, vec!["[INFO] done charts=3"]);
    }

    #[test]
    fn test_debug_filtered_by_default() {
        let ((), lines) = logs(|| tracing::debug!("hidden"));
        assert!(lines.is_empty());
    }
}
