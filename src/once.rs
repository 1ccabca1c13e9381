//! A logger that only writes a keyed message a limited number of times.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::handler::{Chunk, Handler};
use crate::line::{LineMode, LineWriter};

/// Writes each keyed message at most `limit` times over the logger's lifetime, regardless of any
/// verbosity level. Useful for warnings raised from inside loops.
#[derive(Debug, Clone)]
pub struct OnceLogger<K = String> {
    writer: LineWriter,
    /// How many times each key has been written.
    counts: HashMap<K, usize>,
}

impl<K: Eq + Hash> OnceLogger<K> {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self {
            writer: LineWriter::new(handlers),
            counts: HashMap::new(),
        }
    }

    /// Write `msg` unless something was already written for `key`.
    pub fn emit<Q>(&mut self, key: &Q, msg: &str)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.emit_limited(key, msg, 1);
    }

    /// Write `msg` unless `limit` messages were already written for `key`.
    pub fn emit_limited<Q>(&mut self, key: &Q, msg: &str, limit: usize)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.emit_with(key, msg, limit, LineMode::LF);
    }

    /// [`emit_limited()`][Self::emit_limited()] with an explicit line mode.
    pub fn emit_with<Q>(&mut self, key: &Q, msg: &str, limit: usize, mode: LineMode)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if self.count(key) >= limit {
            return;
        }

        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_owned(), 1);
            }
        }
        self.writer.write(&[Chunk::plain(msg)], mode);
    }

    /// How many times something was written for `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Forget that `key` was written so it can be written again.
    pub fn reset<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.remove(key);
    }

    pub fn reset_all(&mut self) {
        self.counts.clear();
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

    /// Share the line state with another logger's writer.
    pub(crate) fn share_line(&mut self, writer: &LineWriter) {
        self.writer.share_line(writer);
    }
}

impl<K: Eq + Hash> Default for OnceLogger<K> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Buffer;

    const MSG: &str = "Test level 2";

    #[test]
    fn writes_each_key_once() {
        let buffer = Buffer::new();
        let mut once: OnceLogger = OnceLogger::new(vec![buffer.handler()]);

        once.emit("X", MSG);
        once.emit("X", MSG);
        assert_eq!(buffer.contents(), format!("{MSG}\n"));

        once.emit_limited("Y", "XXX", 2);
        once.emit_limited("Y", "XXX", 2);
        once.emit_limited("Y", "XXX", 2);
        assert_eq!(buffer.contents(), format!("{MSG}\nXXX\nXXX\n"));
        assert_eq!(once.count("Y"), 2);
        assert_eq!(once.count("Z"), 0);
    }

    #[test]
    fn reset_allows_writing_again() {
        let buffer = Buffer::new();
        let mut once: OnceLogger = OnceLogger::new(vec![buffer.handler()]);

        once.emit("X", "first");
        once.reset("X");
        once.emit("X", "second");
        once.emit("X", "third");
        assert_eq!(buffer.contents(), "first\nsecond\n");
    }

    #[test]
    fn non_string_keys() {
        let buffer = Buffer::new();
        let mut once: OnceLogger<(u32, u32)> = OnceLogger::new(vec![buffer.handler()]);

        once.emit(&(1, 2), "a");
        once.emit(&(1, 2), "b");
        once.emit(&(2, 1), "c");
        assert_eq!(buffer.contents(), "a\nc\n");
    }
}
