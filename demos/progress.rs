use verbosity::{LineMode, LoggerBuilder};

fn main() {
    // The verbose level and active debug ids can be changed through the `VERBOSITY` and
    // `VERBOSITY_DEBUG` environment variables
    let mut verbosity = LoggerBuilder::new(2)
        .with_debug_id("SLC", "Searchlight progress")
        .with_environment()
        .expect("Invalid logging configuration in the environment")
        .build();

    verbosity.verbose.emit(1, "Loading dataset");
    verbosity.verbose.emit_with(2, "Mapping features...", LineMode::NO_LF);
    verbosity.verbose.emit(2, " done");

    let spheres = 50;
    for sphere in 1..=spheres {
        verbosity
            .verbose
            .emit_with(2, &format!("Sphere {sphere}/{spheres}"), LineMode::CR);
        verbosity.debug.emit("SLC", &format!("sphere {sphere} has 27 features"));
        if sphere % 20 == 0 {
            verbosity
                .once
                .emit("slow", "Searchlight is running slowly, consider fewer spheres");
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    verbosity.verbose.emit(2, "");
    verbosity.verbose.emit(1, "Finished");
}
