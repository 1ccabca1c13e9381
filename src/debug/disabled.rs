use std::collections::BTreeSet;

use super::{DebugId, DebugMetric};
use crate::handler::Handler;
use crate::line::{LineMode, LineWriter};

/// Stand-in for the debug logger when the `debug` feature is disabled. Every method is a no-op,
/// nothing is ever written, and no id is ever active.
#[derive(Debug, Clone, Default)]
pub struct DebugLogger {
    active: BTreeSet<DebugId>,
}

#[allow(unused_variables)]
impl DebugLogger {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn emit(&mut self, id: impl Into<DebugId>, msg: &str) {}

    #[inline(always)]
    pub fn emit_with(&mut self, id: impl Into<DebugId>, msg: &str, mode: LineMode) {}

    pub fn register(&mut self, id: impl Into<DebugId>, description: impl Into<String>) {}

    pub fn registered(&self) -> impl Iterator<Item = (&DebugId, &str)> {
        std::iter::empty()
    }

    pub fn is_active(&self, id: impl Into<DebugId>) -> bool {
        false
    }

    pub fn active(&self) -> &BTreeSet<DebugId> {
        &self.active
    }

    pub fn set_active<I>(&mut self, ids: I) -> BTreeSet<DebugId>
    where
        I: IntoIterator,
        I::Item: Into<DebugId>,
    {
        BTreeSet::new()
    }

    pub fn activate(&mut self, id: impl Into<DebugId>) {}

    pub fn deactivate(&mut self, id: impl Into<DebugId>) {}

    pub fn activate_all(&mut self) {}

    pub fn offset_by_depth(&self) -> bool {
        false
    }

    pub fn set_offset_by_depth(&mut self, offset_by_depth: bool) {}

    pub fn depth(&self) -> usize {
        0
    }

    pub fn enter(&mut self) {}

    pub fn leave(&mut self) {}

    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        f(self)
    }

    pub fn set_indent(&mut self, indent: impl Into<String>) {}

    pub fn metrics(&self) -> &[DebugMetric] {
        &[]
    }

    pub fn set_metrics(&mut self, metrics: impl IntoIterator<Item = DebugMetric>) {}

    pub fn handlers(&self) -> &[Handler] {
        &[]
    }

    pub fn set_handlers(&mut self, handlers: Vec<Handler>) -> Vec<Handler> {
        Vec::new()
    }

    pub fn add_handler(&mut self, handler: Handler) {}

    pub(crate) fn share_line(&mut self, writer: &LineWriter) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Buffer;

    #[test]
    fn never_writes() {
        let buffer = Buffer::new();
        let mut debug = DebugLogger::new(vec![buffer.handler()]);
        debug.set_active(["SLC"]);
        debug.emit("SLC", "hidden");

        assert!(!debug.is_active("SLC"));
        assert_eq!(buffer.contents(), "");
    }
}
