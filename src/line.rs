//! Line bookkeeping shared by all loggers: linefeeds, inline continuation, and carriage-return
//! rewriting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::handler::{Chunk, Handler};

/// How a single emission ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMode {
    /// Terminate the line with a linefeed.
    pub lf: bool,
    /// Rewrite the current line in place. Implies `lf = false`.
    pub cr: bool,
}

impl LineMode {
    /// A regular, newline terminated line.
    pub const LF: LineMode = LineMode {
        lf: true,
        cr: false,
    };
    /// Leave the line open so the next emission continues it.
    pub const NO_LF: LineMode = LineMode {
        lf: false,
        cr: false,
    };
    /// Overwrite whatever the previous carriage-return emission printed.
    pub const CR: LineMode = LineMode {
        lf: false,
        cr: true,
    };
}

impl Default for LineMode {
    fn default() -> Self {
        Self::LF
    }
}

/// Where the current line stands. Shared between the loggers of a
/// [`Verbosity`][crate::Verbosity] so they don't write over each other's open lines.
#[derive(Debug)]
struct LineState {
    /// Whether the previous emission terminated its line. New lines get indented.
    lf_prev: bool,
    /// The printed width of the current unterminated line, erased by the next carriage return.
    cr_width: usize,
    /// The writer that made the previous emission.
    owner: usize,
}

/// Used to tell apart writers sharing a [`LineState`].
static NEXT_WRITER_ID: AtomicUsize = AtomicUsize::new(0);

/// Writes emissions to a set of handlers while tracking where the current line stands.
#[derive(Debug)]
pub(crate) struct LineWriter {
    pub handlers: Vec<Handler>,
    id: usize,
    state: Arc<Mutex<LineState>>,
}

impl Clone for LineWriter {
    /// The clone continues from the current line state but tracks it separately.
    fn clone(&self) -> Self {
        let state = self.lock();
        let id = NEXT_WRITER_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            handlers: self.handlers.clone(),
            id,
            state: Arc::new(Mutex::new(LineState {
                lf_prev: state.lf_prev,
                cr_width: state.cr_width,
                owner: if state.owner == self.id { id } else { state.owner },
            })),
        }
    }
}

impl LineWriter {
    pub fn new(handlers: Vec<Handler>) -> Self {
        let id = NEXT_WRITER_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            handlers,
            id,
            state: Arc::new(Mutex::new(LineState {
                lf_prev: true,
                cr_width: 0,
                owner: id,
            })),
        }
    }

    /// Track the line together with `other`. A line left open by one of the writers is
    /// terminated before another one writes to it.
    pub fn share_line(&mut self, other: &LineWriter) {
        self.state = Arc::clone(&other.state);
    }

    /// Whether the next emission starts a fresh line.
    pub fn at_line_start(&self) -> bool {
        let state = self.lock();
        state.lf_prev || state.owner != self.id
    }

    /// Write one emission consisting of `chunks` to every handler. Write failures are ignored,
    /// emitting is always total.
    pub fn write(&mut self, chunks: &[Chunk], mode: LineMode) {
        let width: usize = chunks.iter().map(|chunk| chunk.text.chars().count()).sum();
        let mut state = self.lock();

        let erase;
        let mut output: Vec<Chunk> = Vec::with_capacity(chunks.len() + 3);
        if !state.lf_prev && state.owner != self.id {
            output.push(Chunk::plain("\n"));
            state.lf_prev = true;
            state.cr_width = 0;
        }
        state.owner = self.id;

        let lf = if mode.cr {
            if state.cr_width > 0 {
                erase = format!("\r{}\r", " ".repeat(state.cr_width));
                output.push(Chunk::plain(&erase));
            }
            output.extend_from_slice(chunks);
            state.cr_width = width;

            false
        } else {
            output.extend_from_slice(chunks);
            state.cr_width += width;
            if mode.lf {
                output.push(Chunk::plain("\n"));
                state.cr_width = 0;
            }

            mode.lf
        };
        state.lf_prev = lf;
        drop(state);

        for handler in &self.handlers {
            let _ = handler.write_chunks(&output);
        }
    }

    fn lock(&self) -> MutexGuard<'_, LineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
