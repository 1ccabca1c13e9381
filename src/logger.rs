//! The leveled verbose logger.

use std::error::Error;
use std::fmt::Display;

use crate::handler::{Chunk, Handler};
use crate::line::{LineMode, LineWriter};

/// The indentation used for every level unless configured otherwise.
pub const DEFAULT_INDENT: &str = " ";

/// A verbose logger. Messages are only written when their level does not exceed the logger's
/// threshold, and new lines are indented by the message's level.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Messages with a level above this threshold are dropped.
    level: u32,
    /// Repeated once per level at the start of every line.
    indent: String,
    writer: LineWriter,
}

/// A snapshot of a logger's configuration. Used to temporarily swap the level, indentation, or
/// handlers and put the old configuration back afterwards.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: u32,
    pub indent: String,
    pub handlers: Vec<Handler>,
}

/// An error raised when changing a logger's verbosity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetLevelError {
    /// Verbosity levels cannot be negative.
    InvalidArgument(i64),
}

impl Error for SetLevelError {}

impl Display for SetLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetLevelError::InvalidArgument(level) => {
                write!(f, "Invalid verbosity level {level}, levels must be non-negative")
            }
        }
    }
}

impl Logger {
    /// A logger without any handlers. Everything emitted is dropped until a handler is added.
    pub fn new(level: u32) -> Self {
        Self::with_handlers(level, Vec::new())
    }

    pub fn with_handlers(level: u32, handlers: Vec<Handler>) -> Self {
        Self {
            level,
            indent: DEFAULT_INDENT.to_owned(),
            writer: LineWriter::new(handlers),
        }
    }

    /// Write a newline terminated message if `level` is enabled.
    pub fn emit(&mut self, level: u32, msg: &str) {
        self.emit_with(level, msg, LineMode::LF);
    }

    /// Write a message if `level` is enabled. The message is only indented when it starts a new
    /// line, so messages written with [`LineMode::NO_LF`] can be continued by later calls.
    pub fn emit_with(&mut self, level: u32, msg: &str, mode: LineMode) {
        self.emit_chunks(level, &[Chunk::plain(msg)], mode);
    }

    /// Like [`emit_with()`][Self::emit_with()], for messages made of several (colored) chunks.
    pub(crate) fn emit_chunks(&mut self, level: u32, chunks: &[Chunk], mode: LineMode) {
        if !self.enabled(level) {
            return;
        }

        let indent = if self.writer.at_line_start() {
            self.indent.repeat(level as usize)
        } else {
            String::new()
        };
        let mut output = Vec::with_capacity(chunks.len() + 1);
        output.push(Chunk::plain(&indent));
        output.extend_from_slice(chunks);
        self.writer.write(&output, mode);
    }

    /// Whether messages at `level` are written.
    pub fn enabled(&self, level: u32) -> bool {
        level <= self.level
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Change the threshold. Negative levels are rejected and leave the current level in place.
    pub fn set_level(&mut self, level: i64) -> Result<(), SetLevelError> {
        self.level = u32::try_from(level).map_err(|_| SetLevelError::InvalidArgument(level))?;

        Ok(())
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    pub fn set_indent(&mut self, indent: impl Into<String>) {
        self.indent = indent.into();
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.writer.handlers
    }

    /// Replace the handlers, returning the old ones so they can be put back later.
    pub fn set_handlers(&mut self, handlers: Vec<Handler>) -> Vec<Handler> {
        std::mem::replace(&mut self.writer.handlers, handlers)
    }

    pub fn add_handler(&mut self, handler: Handler) {
        self.writer.handlers.push(handler);
    }

    pub(crate) fn line_writer(&self) -> &LineWriter {
        &self.writer
    }

    /// The current level, indentation, and handlers.
    pub fn config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.level,
            indent: self.indent.clone(),
            handlers: self.writer.handlers.clone(),
        }
    }

    /// Apply `config` and return the configuration it replaced.
    pub fn replace_config(&mut self, config: LoggerConfig) -> LoggerConfig {
        let previous = self.config();
        self.level = config.level;
        self.indent = config.indent;
        self.writer.handlers = config.handlers;

        previous
    }

    /// Run `f` with `config` applied, restoring the previous configuration when `f` returns.
    pub fn with_config<R>(&mut self, config: LoggerConfig, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.replace_config(config);
        let result = f(self);
        self.replace_config(previous);

        result
    }
}

/// Write a formatted message to a [`Logger`]. The message is only formatted when the level is
/// enabled.
///
/// ```
/// let buffer = verbosity::Buffer::new();
/// let mut logger = verbosity::Logger::with_handlers(2, vec![buffer.handler()]);
/// verbosity::verbose!(logger, 1, "loaded {} samples", 42);
/// verbosity::verbose!(logger, 3, "not shown");
/// assert_eq!(buffer.contents(), " loaded 42 samples\n");
/// ```
#[macro_export]
macro_rules! verbose {
    ($logger:expr, $level:expr, $($msg:tt)+) => {{
        let level: u32 = $level;
        if $logger.enabled(level) {
            $logger.emit(level, &format!($($msg)+));
        }
    }};
}
