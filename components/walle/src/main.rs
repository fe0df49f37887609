// Local crates
use walle::bootstrap::launcher::Launcher;
use walle::helpers::colored_writer::ColoredWriter;
use walle::instrumentation;

// External crates
use std::io::Write;
use std::process;

#[tokio::main]
async fn main() {
    instrumentation::tracing::init_panic_handler();

    // Launcher construction performs the eager flag pre-parse; a malformed
    // global flag aborts here, before any subcommand can run.
    let launcher = match Launcher::new() {
        Ok(launcher) => launcher,
        Err(err) => fatal(&format!("{err}")),
    };

    if let Err(err) = launcher.start().await {
        fatal(&format!("{err:#}"));
    }
}

/// Reports a fatal error through the colored stderr sink and exits non-zero.
fn fatal(message: &str) -> ! {
    let mut sink = ColoredWriter::stderr();
    let _ = writeln!(sink, "{message}");
    process::exit(1);
}
