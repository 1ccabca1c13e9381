use verbosity::{Buffer, LineMode, LoggerBuilder, OutputTarget};

#[test]
fn progress_line_followed_by_summary() {
    let buffer = Buffer::new();
    let mut verbosity = LoggerBuilder::new(1).with_handler(buffer.handler()).build();

    for done in 1..=3 {
        verbosity
            .verbose
            .emit_with(1, &format!("{done}/3 spheres"), LineMode::CR);
    }
    verbosity.verbose.emit(1, "");
    verbosity.verbose.emit(1, "finished");

    // Only the first line is indented since rewrites continue the same line
    let expected = format!(
        " 1/3 spheres\r{}\r2/3 spheres\r{}\r3/3 spheres\n finished\n",
        " ".repeat(12),
        " ".repeat(11)
    );
    assert_eq!(buffer.contents(), expected);
}

#[test]
fn file_and_memory_handlers_receive_the_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verbose.log");

    let buffer = Buffer::new();
    let mut verbosity = LoggerBuilder::new(2)
        .with_handler(buffer.handler())
        .with_output_target(OutputTarget::File(path.clone()))
        .unwrap()
        .build();
    verbosity.verbose.emit_with(1, "working", LineMode::NO_LF);
    verbosity.verbose.emit(2, "... done");
    verbosity.once.emit("deprecated", "deprecated option used");
    verbosity.once.emit("deprecated", "deprecated option used");

    let expected = " working... done\ndeprecated option used\n";
    assert_eq!(buffer.contents(), expected);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
}
