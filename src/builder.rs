//! A builder interface for the loggers.

use log::SetLoggerError;
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;

use crate::context::Verbosity;
use crate::debug::{DebugId, DebugMetric};
use crate::global;
use crate::handler::Handler;

/// The environment variable holding the verbose level.
pub const VERBOSITY_ENV: &str = "VERBOSITY";
/// The environment variable holding a comma separated list of debug ids to activate.
pub const VERBOSITY_DEBUG_ENV: &str = "VERBOSITY_DEBUG";
/// The environment variable holding a comma separated list of debug metrics.
pub const VERBOSITY_DEBUG_METRICS_ENV: &str = "VERBOSITY_DEBUG_METRICS";
/// The environment variable selecting the output target.
pub const VERBOSITY_OUTPUT_ENV: &str = "VERBOSITY_OUTPUT";

/// Constructs a [`Verbosity`] context.
#[derive(Debug)]
pub struct LoggerBuilder {
    level: u32,
    indent: Option<String>,
    /// Explicitly added handlers. When this is empty the output target from the environment is
    /// used instead.
    handlers: Vec<Handler>,
    debug_ids: Vec<(DebugId, String)>,
    active_debug_ids: Vec<DebugId>,
    debug_metrics: Vec<DebugMetric>,
    offset_by_depth: bool,
}

/// Determines where the loggers should write their output. If no explicit target or handler is
/// chosen, then the `VERBOSITY_OUTPUT` environment variable decides, falling back to STDERR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write directly to STDERR.
    Stderr,
    /// Write directly to STDOUT.
    Stdout,
    /// Append the output to a file.
    File(PathBuf),
}

/// An error raised when setting the logger's output target. This can be converted back to the
/// builder using `Into<LoggerBuilder>`.
#[derive(Debug)]
pub enum SetTargetError {
    FileOpenError {
        builder: LoggerBuilder,
        path: PathBuf,
        error: std::io::Error,
    },
}

impl From<SetTargetError> for LoggerBuilder {
    fn from(value: SetTargetError) -> Self {
        match value {
            SetTargetError::FileOpenError { builder, .. } => builder,
        }
    }
}

impl Error for SetTargetError {}

impl Display for SetTargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetTargetError::FileOpenError {
                builder: _,
                path,
                error,
            } => {
                write!(f, "Could not open '{}' ({})", path.display(), error)
            }
        }
    }
}

/// An error raised when the environment contains an invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// `VERBOSITY` is not a non-negative integer.
    InvalidLevel(String),
    /// `VERBOSITY_DEBUG_METRICS` contains an unknown metric.
    InvalidMetric(String),
}

impl Error for EnvironmentError {}

impl Display for EnvironmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentError::InvalidLevel(value) => write!(
                f,
                "Invalid {VERBOSITY_ENV} value '{value}', expected a non-negative integer"
            ),
            EnvironmentError::InvalidMetric(value) => write!(
                f,
                "Unknown debug metric '{value}' in {VERBOSITY_DEBUG_METRICS_ENV}, expected one of \
                 'asctime', 'reltime', or 'pid'"
            ),
        }
    }
}

impl LoggerBuilder {
    /// A builder for loggers that write verbose messages up to and including `level`.
    pub fn new(level: u32) -> Self {
        Self {
            level,
            indent: None,
            handlers: Vec::new(),
            debug_ids: Vec::new(),
            active_debug_ids: Vec::new(),
            debug_metrics: Vec::new(),
            offset_by_depth: true,
        }
    }

    /// Build the loggers.
    pub fn build(self) -> Verbosity {
        let handlers = if self.handlers.is_empty() {
            vec![default_handler_from_environment()]
        } else {
            self.handlers
        };

        let mut verbosity = Verbosity::new(self.level, handlers);
        if let Some(indent) = self.indent {
            verbosity.debug.set_indent(indent.clone());
            verbosity.verbose.set_indent(indent);
        }

        // Ids need to be registered before activating them so `ALL` picks them up
        for (id, description) in self.debug_ids {
            verbosity.debug.register(id, description);
        }
        verbosity.debug.set_active(self.active_debug_ids);
        verbosity.debug.set_metrics(self.debug_metrics);
        verbosity.debug.set_offset_by_depth(self.offset_by_depth);

        verbosity
    }

    /// Install the configured loggers as the global logger. This also routes the `log` crate's
    /// macros to the verbose logger. The global logger can only be set once.
    pub fn build_global(self) -> Result<(), SetLoggerError> {
        global::install(self.build())
    }

    /// Explicitly set the output target for the loggers. This is normally set using the
    /// `VERBOSITY_OUTPUT` environment variable. Returns an error if the target could not be set.
    pub fn with_output_target(mut self, target: OutputTarget) -> Result<Self, SetTargetError> {
        let handler = match target {
            OutputTarget::Stderr => Handler::stderr(),
            OutputTarget::Stdout => Handler::stdout(),
            OutputTarget::File(path) => match Handler::file(&path) {
                Ok(handler) => handler,
                Err(error) => {
                    return Err(SetTargetError::FileOpenError {
                        builder: self,
                        path,
                        error,
                    })
                }
            },
        };
        self.handlers.push(handler);

        Ok(self)
    }

    /// Also write to `handler`. Can be called multiple times.
    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// The string repeated once per level when indenting new lines.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Register a debug id with a description of what it covers.
    pub fn with_debug_id(mut self, id: impl Into<DebugId>, description: impl Into<String>) -> Self {
        self.debug_ids.push((id.into(), description.into()));
        self
    }

    /// Activate debug output for these ids.
    pub fn with_active_debug_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DebugId>,
    {
        self.active_debug_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_debug_metrics(mut self, metrics: impl IntoIterator<Item = DebugMetric>) -> Self {
        self.debug_metrics.extend(metrics);
        self
    }

    pub fn with_offset_by_depth(mut self, offset_by_depth: bool) -> Self {
        self.offset_by_depth = offset_by_depth;
        self
    }

    /// Apply the `VERBOSITY`, `VERBOSITY_DEBUG`, and `VERBOSITY_DEBUG_METRICS` environment
    /// variables on top of the current configuration. Unset or empty variables are ignored.
    pub fn with_environment(self) -> Result<Self, EnvironmentError> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(
        mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, EnvironmentError> {
        if let Some(level) = non_empty(var(VERBOSITY_ENV)) {
            self.level = level
                .trim()
                .parse()
                .map_err(|_| EnvironmentError::InvalidLevel(level.clone()))?;
        }

        if let Some(ids) = non_empty(var(VERBOSITY_DEBUG_ENV)) {
            self.active_debug_ids.extend(
                split_list(&ids).map(|id| id.parse::<DebugId>().unwrap_or_else(|e| match e {})),
            );
        }

        if let Some(metrics) = non_empty(var(VERBOSITY_DEBUG_METRICS_ENV)) {
            for metric in split_list(&metrics) {
                self.debug_metrics
                    .push(metric.parse().map_err(EnvironmentError::InvalidMetric)?);
            }
        }

        Ok(self)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// If the `VERBOSITY_OUTPUT` environment variable is set, then it selects STDERR, STDOUT, or a
/// file to append to. Otherwise defaults to STDERR. If the file couldn't be opened, then this will
/// write the error to STDERR and then also fall back to STDERR.
fn default_handler_from_environment() -> Handler {
    handler_for_output(std::env::var(VERBOSITY_OUTPUT_ENV).ok().as_deref())
}

fn handler_for_output(output_env: Option<&str>) -> Handler {
    let output_env_str = output_env.unwrap_or("").trim();
    if output_env_str.eq_ignore_ascii_case("stdout") {
        return Handler::stdout();
    }
    if !output_env_str.is_empty() && !output_env_str.eq_ignore_ascii_case("stderr") {
        match Handler::file(output_env_str) {
            Ok(handler) => return handler,
            Err(err) => eprintln!(
                "Could not open '{output_env_str}' from {VERBOSITY_OUTPUT_ENV} for logging, \
                 falling back to STDERR: {err}"
            ),
        }
    }

    Handler::stderr()
}
