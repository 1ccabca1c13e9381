//! Leveled verbose output, keyed once-only messages, and category based debug output for command
//! line tools. All loggers write to shared [`Handler`]s and support continuing a line across calls
//! and rewriting a line in place for progress output.

mod builder;
mod context;
mod debug;
mod global;
mod handler;
mod line;
mod logger;
mod once;

pub use builder::{
    EnvironmentError, LoggerBuilder, OutputTarget, SetTargetError, VERBOSITY_DEBUG_ENV,
    VERBOSITY_DEBUG_METRICS_ENV, VERBOSITY_ENV, VERBOSITY_OUTPUT_ENV,
};
pub use context::Verbosity;
pub use debug::{DebugId, DebugLogger, DebugMetric, ALL_IDS};
pub use global::{max_level_filter, verbose_level, with_global};
pub use handler::{Buffer, Chunk, Handler};
pub use line::LineMode;
pub use log::SetLoggerError;
pub use logger::{Logger, LoggerConfig, SetLevelError, DEFAULT_INDENT};
pub use once::OnceLogger;
pub use termcolor::Color;
