fn main() {
    // The output target is determined by the `VERBOSITY_OUTPUT` environment variable
    verbosity::LoggerBuilder::new(4)
        .build_global()
        // In this example something would have gone very wrong if we cannot set up the logger.
        // If there however is a possibility that the logger is configured multiple times then this
        // error should be handled appropriately.
        .expect("A logger has already been set up");

    // Each `log` level maps to a verbose level, lower levels are indented less
    log::error!("This is an error");
    log::warn!("This is a warning");
    log::info!("This is a regular log message");
    log::debug!("This is a debug message");
    log::trace!("This is a trace message");

    verbosity::with_global(|verbosity| verbosity.verbose.emit(1, "Written directly"));
}
