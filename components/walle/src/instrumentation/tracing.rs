// External crates
use std::panic;
use tracing::error;
use tracing_error::ErrorLayer;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, registry::Registry};

/// Initializes the global tracing subscriber.
///
/// Dev mode lowers the default filter to `debug`; an explicit `RUST_LOG`
/// always wins. Repeated calls are no-ops so tests can bootstrap several
/// launchers in one process.
pub fn init_tracing(is_dev: bool) {
    let default_filter = if is_dev { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default());

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Routes panic reports through tracing so they carry the same structure as
/// the rest of the diagnostics. Panics indicate a programming defect; the
/// process still aborts through the default unwind path.
pub fn init_panic_handler() {
    panic::set_hook(Box::new(|panic_info| {
        let message = match panic_info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => s.as_str(),
                None => "unknown panic",
            },
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(message = %message, location = %location, "application panicked");
    }));
}
