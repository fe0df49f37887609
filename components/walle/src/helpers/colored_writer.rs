// External crates
use colored::{Color, control};
use std::io::{self, Write};

/// Colored wrapper around an output stream.
///
/// Every `write` call is self-contained: the color attribute is attached,
/// the payload bytes go out verbatim, and the reset is attempted before the
/// call returns, even when the payload write fails midway. No color state
/// leaks into later output.
#[derive(Debug)]
pub struct ColoredWriter<W: Write> {
    inner: W,
    color: Color,
}

impl ColoredWriter<io::Stderr> {
    /// Returns a red colored stderr writer for diagnostic output.
    pub fn stderr() -> Self {
        Self::new(io::stderr(), Color::Red)
    }
}

impl<W: Write> ColoredWriter<W> {
    pub fn new(inner: W, color: Color) -> Self {
        Self { inner, color }
    }

    /// Unwraps the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ColoredWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !control::SHOULD_COLORIZE.should_colorize() {
            return self.inner.write_all(buf).map(|()| buf.len());
        }

        let prefix = format!("\x1b[{}m", self.color.to_fg_str());
        self.inner.write_all(prefix.as_bytes())?;
        let payload = self.inner.write_all(buf);

        // The reset runs regardless of the payload outcome, so the color
        // attribute never outlives the call.
        let reset = self.inner.write_all(b"\x1b[0m");

        payload.and(reset).map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
