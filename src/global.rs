//! The optional process-wide instance. Installing it also makes the `log` crate's macros write
//! through the verbose logger.

use log::{Level, LevelFilter, Log, SetLoggerError};
use once_cell::sync::OnceCell;
use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use termcolor::Color;

use crate::context::Verbosity;
use crate::handler::Chunk;
use crate::line::LineMode;

/// The global instance. Initialized in [`LoggerBuilder::build_global()`][crate::LoggerBuilder::build_global()]
/// and then set as the global logger using [`log::set_logger()`].
static LOGGER_INSTANCE: OnceCell<GlobalLogger> = OnceCell::new();

thread_local! {
    /// Whether this thread currently holds the global instance's lock. Logging while holding it,
    /// for instance from a handler's writer or from within [`with_global()`], would otherwise
    /// deadlock.
    static HOLDS_LOCK: Cell<bool> = Cell::new(false);
}

/// Forwards `log` records to the verbose logger.
struct GlobalLogger {
    context: Mutex<Verbosity>,
    /// Mirrors the verbose logger's level so checking whether a record is enabled never locks.
    level: AtomicU32,
}

/// Exclusive access to the global instance. Clears [`HOLDS_LOCK`] on drop.
struct ContextGuard<'a> {
    context: MutexGuard<'a, Verbosity>,
}

impl GlobalLogger {
    /// Lock the context, or return `None` if this thread already holds it.
    fn lock(&self) -> Option<ContextGuard<'_>> {
        if HOLDS_LOCK.with(Cell::get) {
            return None;
        }

        let context = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        HOLDS_LOCK.with(|holds_lock| holds_lock.set(true));

        Some(ContextGuard { context })
    }

    /// Propagate the verbose level to the `log` crate and the level mirror.
    fn sync_level(&self, level: u32) {
        self.level.store(level, Ordering::Relaxed);
        log::set_max_level(max_level_filter(level));
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        HOLDS_LOCK.with(|holds_lock| holds_lock.set(false));
    }
}

impl Deref for ContextGuard<'_> {
    type Target = Verbosity;

    fn deref(&self) -> &Verbosity {
        &self.context
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Verbosity {
        &mut self.context
    }
}

/// The verbose level a `log` record is written at. Errors are always written.
pub fn verbose_level(level: Level) -> u32 {
    match level {
        Level::Error => 0,
        Level::Warn => 1,
        Level::Info => 2,
        Level::Debug => 3,
        Level::Trace => 4,
    }
}

/// The most verbose `log` level that still passes a verbose logger at `level`.
pub fn max_level_filter(level: u32) -> LevelFilter {
    match level {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub(crate) fn install(verbosity: Verbosity) -> Result<(), SetLoggerError> {
    let level = verbosity.verbose.level();
    // If an instance was installed before then `log::set_logger()` fails and `verbosity` is
    // dropped
    let instance = LOGGER_INSTANCE.get_or_init(move || GlobalLogger {
        context: Mutex::new(verbosity),
        level: AtomicU32::new(level),
    });

    log::set_logger(instance)?;
    instance.sync_level(level);

    Ok(())
}

/// Run `f` with the globally installed loggers. Returns `None` if nothing was installed, or when
/// called from within another `with_global()` call on the same thread. Changes to the verbose
/// level are propagated to the `log` crate's maximum level. Records logged through the `log`
/// macros from within `f` are dropped.
pub fn with_global<R>(f: impl FnOnce(&mut Verbosity) -> R) -> Option<R> {
    let instance = LOGGER_INSTANCE.get()?;
    let mut context = instance.lock()?;
    let result = f(&mut context);
    instance.sync_level(context.verbose.level());

    Some(result)
}

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        verbose_level(metadata.level()) <= self.level.load(Ordering::Relaxed)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Formatting happens before locking since `Display` implementations may log themselves
        let level = verbose_level(record.level());
        let message = record.args().to_string();
        let Some(mut context) = self.lock() else {
            return;
        };
        match record.level() {
            Level::Error => context.verbose.emit_chunks(
                level,
                &[Chunk::colored("ERROR: ", Color::Red), Chunk::plain(&message)],
                LineMode::LF,
            ),
            Level::Warn => context.verbose.emit_chunks(
                level,
                &[
                    Chunk::colored("WARNING: ", Color::Yellow),
                    Chunk::plain(&message),
                ],
                LineMode::LF,
            ),
            _ => context.verbose.emit(level, &message),
        }
    }

    fn flush(&self) {
        // Handlers are flushed after every emission
    }
}
