//! The set of loggers an application passes around.

use crate::debug::DebugLogger;
use crate::handler::Handler;
use crate::logger::Logger;
use crate::once::OnceLogger;

/// The verbose, debug, and once loggers of an application. Construct one with the
/// [`LoggerBuilder`][crate::LoggerBuilder] and hand it (or the individual loggers) to whatever
/// needs to produce output.
#[derive(Debug)]
pub struct Verbosity {
    pub verbose: Logger,
    pub debug: DebugLogger,
    pub once: OnceLogger,
}

impl Verbosity {
    /// All three loggers writing to the same handlers. Debug output starts with no active ids.
    /// The loggers track a single line, so a line left open by one of them (for instance a
    /// carriage-return progress line) is terminated before another one writes.
    pub fn new(level: u32, handlers: Vec<Handler>) -> Self {
        let mut verbosity = Self {
            verbose: Logger::with_handlers(level, handlers.clone()),
            debug: DebugLogger::new(handlers.clone()),
            once: OnceLogger::new(handlers),
        };
        verbosity.share_line();

        verbosity
    }

    fn share_line(&mut self) {
        self.debug.share_line(self.verbose.line_writer());
        self.once.share_line(self.verbose.line_writer());
    }

    /// Point all three loggers at `handlers`, returning the verbose logger's previous handlers.
    pub fn set_handlers(&mut self, handlers: Vec<Handler>) -> Vec<Handler> {
        self.debug.set_handlers(handlers.clone());
        self.once.set_handlers(handlers.clone());
        self.verbose.set_handlers(handlers)
    }
}

impl Clone for Verbosity {
    /// The clone's loggers share a line with each other, not with the original's loggers.
    fn clone(&self) -> Self {
        let mut verbosity = Self {
            verbose: self.verbose.clone(),
            debug: self.debug.clone(),
            once: self.once.clone(),
        };
        verbosity.share_line();

        verbosity
    }
}
