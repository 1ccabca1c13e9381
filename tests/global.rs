use std::io::Write;
use verbosity::{Buffer, Handler, LoggerBuilder};

/// Forwards everything to a buffer and logs about it while doing so.
struct LoggingWriter(Buffer);

impl Write for LoggingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        log::error!("writing {} bytes", buf.len());
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

// Everything touching the global instance lives in a single test since it can only be installed
// once per process
#[test]
fn log_records_go_through_the_verbose_logger() {
    assert_eq!(verbosity::with_global(|_| ()), None);

    let buffer = Buffer::new();
    LoggerBuilder::new(2)
        .with_handler(buffer.handler())
        .build_global()
        .unwrap();

    log::error!("boom");
    log::warn!("careful");
    log::info!("loaded {} samples", 42);
    log::debug!("not shown");
    assert_eq!(
        buffer.take(),
        "ERROR: boom\n WARNING: careful\n  loaded 42 samples\n"
    );

    verbosity::with_global(|verbosity| verbosity.verbose.set_level(3)).unwrap().unwrap();
    assert_eq!(log::max_level(), log::LevelFilter::Debug);
    log::debug!("now shown");
    assert_eq!(buffer.take(), "   now shown\n");

    verbosity::with_global(|verbosity| {
        verbosity.verbose.emit(0, "direct");
        verbosity.once.emit("key", "once");
        verbosity.once.emit("key", "once");
    });
    assert_eq!(buffer.take(), "direct\nonce\n");

    // Logging while this thread holds the global instance drops the record instead of blocking
    let nested = verbosity::with_global(|verbosity| {
        log::info!("dropped");
        verbosity.verbose.emit(2, "still written");

        verbosity::with_global(|_| ())
    });
    assert_eq!(nested, Some(None));
    assert_eq!(buffer.take(), "  still written\n");

    // Same for a sink that logs while it is being written to
    let echo = Buffer::new();
    verbosity::with_global(|verbosity| {
        verbosity.verbose.add_handler(Handler::new(LoggingWriter(echo.clone())));
    });
    log::warn!("from a handler");
    assert_eq!(buffer.take(), " WARNING: from a handler\n");
    assert_eq!(echo.take(), " WARNING: from a handler\n");

    assert!(LoggerBuilder::new(0)
        .with_handler(Buffer::new().handler())
        .build_global()
        .is_err());
}
