use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use termcolor::Color;
use time::macros::format_description;
use time::OffsetDateTime;

use super::{DebugId, DebugMetric, ALL_IDS};
use crate::handler::{Chunk, Handler};
use crate::line::{LineMode, LineWriter};
use crate::logger::DEFAULT_INDENT;

/// Writes `[<id>] DEBUG: <message>` lines for the debug ids that are currently active. Debug
/// output ignores the verbose level entirely.
#[derive(Debug, Clone)]
pub struct DebugLogger {
    writer: LineWriter,
    /// Known ids and their descriptions.
    registered: BTreeMap<DebugId, String>,
    active: BTreeSet<DebugId>,
    /// Indent new lines by the current nesting depth.
    offset_by_depth: bool,
    depth: usize,
    indent: String,
    metrics: Vec<DebugMetric>,
    created: Instant,
    /// When the last debug message was written, for [`DebugMetric::RelTime`].
    last_emit: Instant,
}

impl DebugLogger {
    pub fn new(handlers: Vec<Handler>) -> Self {
        let now = Instant::now();
        Self {
            writer: LineWriter::new(handlers),
            registered: BTreeMap::new(),
            active: BTreeSet::new(),
            offset_by_depth: true,
            depth: 0,
            indent: DEFAULT_INDENT.to_owned(),
            metrics: Vec::new(),
            created: now,
            last_emit: now,
        }
    }

    /// Write a newline terminated message if `id` is active.
    pub fn emit(&mut self, id: impl Into<DebugId>, msg: &str) {
        self.emit_with(id, msg, LineMode::LF);
    }

    /// Write a message if `id` is active.
    pub fn emit_with(&mut self, id: impl Into<DebugId>, msg: &str, mode: LineMode) {
        let id = id.into();
        if !self.active.contains(&id) {
            return;
        }

        let indent = if self.offset_by_depth && self.writer.at_line_start() {
            self.indent.repeat(self.depth)
        } else {
            String::new()
        };
        let tag = format!("[{id}]");
        let header = match self.format_metrics() {
            Some(metrics) => format!(" DEBUG {{{metrics}}}: "),
            None => String::from(" DEBUG: "),
        };

        self.writer.write(
            &[
                Chunk::plain(&indent),
                Chunk::colored(&tag, Color::Cyan),
                Chunk::plain(&header),
                Chunk::plain(msg),
            ],
            mode,
        );
    }

    fn format_metrics(&mut self) -> Option<String> {
        if self.metrics.is_empty() {
            return None;
        }

        let now = Instant::now();
        let formatted: Vec<String> = self
            .metrics
            .iter()
            .map(|metric| match metric {
                DebugMetric::AscTime => {
                    let wall_clock = OffsetDateTime::now_local()
                        .unwrap_or_else(|_| OffsetDateTime::now_utc());
                    wall_clock.format(format_description!(
                        "[year]-[month]-[day] [hour]:[minute]:[second]"
                    ))
                    .unwrap_or_default()
                }
                DebugMetric::RelTime => format!(
                    "{:.3}s (+{:.3}s)",
                    now.duration_since(self.created).as_secs_f64(),
                    now.duration_since(self.last_emit).as_secs_f64()
                ),
                DebugMetric::Pid => format!("pid {}", std::process::id()),
            })
            .collect();
        self.last_emit = now;

        Some(formatted.join(" / "))
    }

    /// Make an id known together with a short description of what it covers.
    pub fn register(&mut self, id: impl Into<DebugId>, description: impl Into<String>) {
        self.registered.insert(id.into(), description.into());
    }

    /// All registered ids and their descriptions, ordered by id.
    pub fn registered(&self) -> impl Iterator<Item = (&DebugId, &str)> {
        self.registered
            .iter()
            .map(|(id, description)| (id, description.as_str()))
    }

    pub fn is_active(&self, id: impl Into<DebugId>) -> bool {
        self.active.contains(&id.into())
    }

    pub fn active(&self) -> &BTreeSet<DebugId> {
        &self.active
    }

    /// Replace the active ids, returning the previous set. An id named [`ALL_IDS`] activates
    /// every registered id.
    pub fn set_active<I>(&mut self, ids: I) -> BTreeSet<DebugId>
    where
        I: IntoIterator,
        I::Item: Into<DebugId>,
    {
        let previous = std::mem::take(&mut self.active);
        for id in ids {
            self.activate(id);
        }

        previous
    }

    pub fn activate(&mut self, id: impl Into<DebugId>) {
        match id.into() {
            DebugId::Name(name) if name == ALL_IDS => self.activate_all(),
            id => {
                self.active.insert(id);
            }
        }
    }

    pub fn deactivate(&mut self, id: impl Into<DebugId>) {
        self.active.remove(&id.into());
    }

    /// Activate every registered id.
    pub fn activate_all(&mut self) {
        self.active.extend(self.registered.keys().cloned());
    }

    pub fn offset_by_depth(&self) -> bool {
        self.offset_by_depth
    }

    pub fn set_offset_by_depth(&mut self, offset_by_depth: bool) {
        self.offset_by_depth = offset_by_depth;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Increase the nesting depth. Must be paired with [`leave()`][Self::leave()].
    pub fn enter(&mut self) {
        self.depth += 1;
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` one nesting level deeper.
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter();
        let result = f(self);
        self.leave();

        result
    }

    pub fn set_indent(&mut self, indent: impl Into<String>) {
        self.indent = indent.into();
    }

    pub fn metrics(&self) -> &[DebugMetric] {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: impl IntoIterator<Item = DebugMetric>) {
        self.metrics = metrics.into_iter().collect();
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

impl Default for DebugLogger {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Buffer;

    const MSG: &str = "Test level 2";

    fn logger() -> (DebugLogger, Buffer) {
        let buffer = Buffer::new();
        let mut debug = DebugLogger::new(vec![buffer.handler()]);
        debug.set_active([DebugId::Num(1), DebugId::Num(2), DebugId::from("SLC")]);

        (debug, buffer)
    }

    #[test]
    fn tagged_message_without_offset() {
        let (mut debug, buffer) = logger();
        debug.set_offset_by_depth(false);
        debug.emit_with("SLC", MSG, LineMode::NO_LF);
        assert_eq!(buffer.contents(), format!("[SLC] DEBUG: {MSG}"));
    }

    #[test]
    fn inactive_ids_are_silent() {
        let (mut debug, buffer) = logger();
        debug.emit("CLF", MSG);
        debug.emit(3u32, MSG);
        assert_eq!(buffer.contents(), "");

        debug.emit(2u32, MSG);
        assert_eq!(buffer.contents(), format!("[2] DEBUG: {MSG}\n"));
    }

    #[test]
    fn nesting_offsets_new_lines() {
        let (mut debug, buffer) = logger();
        debug.emit("SLC", "outer");
        debug.nested(|debug| {
            debug.emit("SLC", "inner");
            debug.nested(|debug| debug.emit("SLC", "innermost"));
        });
        debug.emit("SLC", "outer again");

        assert_eq!(debug.depth(), 0);
        assert_eq!(
            buffer.contents(),
            "[SLC] DEBUG: outer\n [SLC] DEBUG: inner\n  [SLC] DEBUG: innermost\n[SLC] DEBUG: outer again\n"
        );
    }

    #[test]
    fn activate_all_registered() {
        let buffer = Buffer::new();
        let mut debug = DebugLogger::new(vec![buffer.handler()]);
        debug.register("SLC", "Searchlight progress");
        debug.register(7u32, "Numbered category");

        debug.set_active([ALL_IDS]);
        assert!(debug.is_active("SLC"));
        assert!(debug.is_active(7u32));
        assert!(!debug.is_active("CLF"));

        let descriptions: Vec<_> = debug.registered().map(|(_, d)| d).collect();
        assert_eq!(descriptions, ["Numbered category", "Searchlight progress"]);
    }

    #[test]
    fn set_active_returns_previous_set() {
        let (mut debug, buffer) = logger();
        let previous = debug.set_active(["CLF"]);
        debug.emit("SLC", "hidden");
        debug.set_active(previous);
        debug.emit("SLC", "shown");

        assert_eq!(buffer.contents(), "[SLC] DEBUG: shown\n");
    }

    #[test]
    fn metrics_are_added_to_the_header() {
        let (mut debug, buffer) = logger();
        debug.set_metrics([DebugMetric::Pid]);
        debug.emit("SLC", MSG);

        assert_eq!(
            buffer.contents(),
            format!("[SLC] DEBUG {{pid {}}}: {MSG}\n", std::process::id())
        );
    }

    /// Splits `[SLC] DEBUG {<metrics>}: <msg>\n` into the individual metrics.
    fn metrics_in(line: &str) -> Vec<String> {
        let header = line.strip_prefix("[SLC] DEBUG {").unwrap();
        let (metrics, rest) = header.split_once("}: ").unwrap();
        assert_eq!(rest, format!("{MSG}\n"));

        metrics.split(" / ").map(str::to_owned).collect()
    }

    #[test]
    fn multiple_metrics_are_joined() {
        let (mut debug, buffer) = logger();
        debug.set_metrics([DebugMetric::RelTime, DebugMetric::Pid]);
        debug.emit("SLC", MSG);

        let metrics = metrics_in(&buffer.contents());
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[1], format!("pid {}", std::process::id()));
    }

    #[test]
    fn relative_time_format() {
        let (mut debug, buffer) = logger();
        debug.set_metrics([DebugMetric::RelTime]);
        debug.emit("SLC", MSG);

        // `<total>s (+<since previous>s)`, both with millisecond precision
        let metrics = metrics_in(&buffer.contents());
        let (total, since_last) = metrics[0].split_once("s (+").unwrap();
        let since_last = since_last.strip_suffix("s)").unwrap();
        for seconds in [total, since_last] {
            let (_, fraction) = seconds.split_once('.').unwrap();
            assert_eq!(fraction.len(), 3);
            assert!(seconds.parse::<f64>().unwrap() >= 0.0);
        }
        assert!(since_last.parse::<f64>().unwrap() <= total.parse::<f64>().unwrap());
    }

    #[test]
    fn wall_clock_format() {
        let (mut debug, buffer) = logger();
        debug.set_metrics([DebugMetric::AscTime]);
        debug.emit("SLC", MSG);

        // `YYYY-MM-DD HH:MM:SS`
        let metrics = metrics_in(&buffer.contents());
        let time = metrics[0].as_bytes();
        assert_eq!(time.len(), 19);
        for (i, c) in time.iter().enumerate() {
            match i {
                4 | 7 => assert_eq!(*c, b'-'),
                10 => assert_eq!(*c, b' '),
                13 | 16 => assert_eq!(*c, b':'),
                _ => assert!(c.is_ascii_digit(), "unexpected {:?}", metrics[0]),
            }
        }
    }

    #[test]
    fn manual_depth_tracking() {
        let (mut debug, buffer) = logger();
        debug.enter();
        debug.enter();
        debug.emit("SLC", "deep");
        debug.leave();
        debug.leave();
        debug.leave();
        assert_eq!(debug.depth(), 0);
        debug.emit("SLC", "top");

        assert_eq!(buffer.contents(), "  [SLC] DEBUG: deep\n[SLC] DEBUG: top\n");
    }

    #[test]
    fn deactivated_ids_are_silent() {
        let (mut debug, buffer) = logger();
        debug.deactivate("SLC");
        assert!(!debug.is_active("SLC"));
        assert!(debug.is_active(1u32));

        debug.emit("SLC", MSG);
        debug.emit(1u32, "still active");
        assert_eq!(buffer.contents(), "[1] DEBUG: still active\n");
    }
}
