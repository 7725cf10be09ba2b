//! helpers for logging and timing the demos.
use std::time::{Duration, Instant};

use log::*;

/// Log to stderr.
///
/// If called multiple times in the same process, only applies once.  The level defaults to `info` unless `RUST_LOG`
/// says otherwise.
pub fn log_to_stderr() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format(|buf, record| {
                use std::io::Write;

                let now = time::OffsetDateTime::now_utc();

                writeln!(
                    buf,
                    "{} {} time={} target={}",
                    record.level(),
                    record.args(),
                    now,
                    record.target()
                )
            })
            .init();
    });
}

/// Run `work`, logging how long it took under `name`.
///
/// Returns whatever `work` returned.  Lazy values are not forced: profiling a function that returns an iterator only
/// measures building the iterator, which is half the point of the iterator slides.
pub fn profile<T>(name: &str, work: impl FnOnce() -> T) -> T {
    let (out, elapsed) = timed(work);
    info!("{} took {:.3}s", name, elapsed.as_secs_f64());
    out
}

/// Run `work` and return its output alongside the wall time it took.
pub fn timed<T>(work: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = work();
    (out, start.elapsed())
}
