//! The sinks loggers write to. Handlers are shared handles, so the same sink can be attached to
//! several loggers at once and swapped in and out by the caller.

use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// A piece of a message. The color is only used when the handler writes to a terminal that
/// supports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub text: &'a str,
    pub color: Option<Color>,
}

impl<'a> Chunk<'a> {
    pub fn plain(text: &'a str) -> Self {
        Self { text, color: None }
    }

    pub fn colored(text: &'a str, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}

/// A shared, writable log destination. Cloning a handler clones the handle, not the sink. The
/// loggers never close a handler, the sink is closed once the last clone is dropped.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<Mutex<HandlerImpl>>,
}

/// The actual data needed to write to a handler.
enum HandlerImpl {
    /// Writes directly to STDERR. May use colors depending on the environment.
    Stderr(StandardStream),
    /// Writes directly to STDOUT. May use colors depending on the environment.
    Stdout(StandardStream),
    /// Writes to the file.
    File(BufWriter<File>),
    /// Any other writer supplied by the caller.
    Writer(Box<dyn Write + Send>),
}

impl Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        match &*inner {
            HandlerImpl::Stderr(stderr) => f
                .debug_tuple("Stderr")
                .field(if stderr.supports_color() {
                    &"<stderr stream with color support>"
                } else {
                    &"<stderr stream>"
                })
                .finish(),
            HandlerImpl::Stdout(stdout) => f
                .debug_tuple("Stdout")
                .field(if stdout.supports_color() {
                    &"<stdout stream with color support>"
                } else {
                    &"<stdout stream>"
                })
                .finish(),
            HandlerImpl::File(file) => f.debug_tuple("File").field(file).finish(),
            HandlerImpl::Writer(_) => f.debug_tuple("Writer").field(&"<writer>").finish(),
        }
    }
}

impl Handler {
    /// A handler for an arbitrary writer, for instance a [`Buffer`].
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::from_impl(HandlerImpl::Writer(Box::new(writer)))
    }

    /// A handler that writes to STDERR with optional color support determined by the
    /// environment.
    pub fn stderr() -> Self {
        Self::from_impl(HandlerImpl::Stderr(StandardStream::stderr(
            color_support(atty::Stream::Stderr),
        )))
    }

    /// A handler that writes to STDOUT with optional color support determined by the
    /// environment.
    pub fn stdout() -> Self {
        Self::from_impl(HandlerImpl::Stdout(StandardStream::stdout(
            color_support(atty::Stream::Stdout),
        )))
    }

    /// A handler doing buffered appending writes to a file. The buffer is flushed after every
    /// emission.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::options().create(true).append(true).open(path)?;

        Ok(Self::from_impl(HandlerImpl::File(BufWriter::with_capacity(
            1024, file,
        ))))
    }

    fn from_impl(handler: HandlerImpl) -> Self {
        Self {
            inner: Arc::new(Mutex::new(handler)),
        }
    }

    /// Whether two handlers refer to the same sink.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Write a single emission and flush it. Colors are only emitted for terminal streams.
    pub fn write_chunks(&self, chunks: &[Chunk]) -> std::io::Result<()> {
        let mut inner = self.lock();
        match &mut *inner {
            HandlerImpl::Stderr(stream) | HandlerImpl::Stdout(stream) => {
                write_colored(stream, chunks)?;
                stream.flush()
            }
            HandlerImpl::File(file) => write_plain(file, chunks),
            HandlerImpl::Writer(writer) => write_plain(writer, chunks),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandlerImpl> {
        // A panic while writing does not leave the sink in a state we care about
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_plain<W: Write + ?Sized>(writer: &mut W, chunks: &[Chunk]) -> std::io::Result<()> {
    for chunk in chunks {
        writer.write_all(chunk.text.as_bytes())?;
    }

    writer.flush()
}

fn write_colored(stream: &mut StandardStream, chunks: &[Chunk]) -> std::io::Result<()> {
    for chunk in chunks {
        match chunk.color {
            Some(color) if stream.supports_color() => {
                stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
                stream.write_all(chunk.text.as_bytes())?;
                stream.reset()?;
            }
            _ => stream.write_all(chunk.text.as_bytes())?,
        }
    }

    Ok(())
}

/// An in-memory sink. Clones share the same text, so one clone can be handed to a logger through
/// [`Handler::new()`] while another is used to read back what was written.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    text: Arc<Mutex<String>>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler writing into this buffer.
    pub fn handler(&self) -> Handler {
        Handler::new(self.clone())
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.lock().clone()
    }

    /// Return everything written so far and clear the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.text.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.lock().push_str(&String::from_utf8_lossy(buf));

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Whether to use colors when outputting to a standard stream. Considers the `CLICOLOR`,
/// `CLICOLOR_FORCE`, and `NO_COLOR` environment variables, and whether or not the stream is
/// attached to a real TTY.
fn color_support(stream: atty::Stream) -> ColorChoice {
    if let Ok(value) = std::env::var("CLICOLOR_FORCE") {
        if value.trim() != "0" {
            return ColorChoice::Always;
        }
    }

    if let Ok(value) = std::env::var("NO_COLOR") {
        if value.trim() != "0" {
            return ColorChoice::Never;
        }
    }

    if let Ok(value) = std::env::var("CLICOLOR") {
        if value.trim() == "0" {
            return ColorChoice::Never;
        }
    }

    // If `CLICOLOR` is unset or set to a truthy value, and colors aren't forced, then terminal
    // support determines whether or not colors are used
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_clones_share_text() {
        let buffer = Buffer::new();
        let handler = buffer.handler();
        handler
            .write_chunks(&[Chunk::plain("a"), Chunk::colored("b", Color::Red)])
            .unwrap();

        assert_eq!(buffer.contents(), "ab");
        assert_eq!(buffer.take(), "ab");
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn handler_identity() {
        let buffer = Buffer::new();
        let handler = buffer.handler();
        let other = buffer.handler();

        assert!(handler.ptr_eq(&handler.clone()));
        assert!(!handler.ptr_eq(&other));
    }

    #[test]
    fn file_handler_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.log");

        Handler::file(&path)
            .unwrap()
            .write_chunks(&[Chunk::plain("first\n")])
            .unwrap();
        Handler::file(&path)
            .unwrap()
            .write_chunks(&[Chunk::plain("second\n")])
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
