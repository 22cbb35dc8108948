/// Runs given function and, with the `metrics` feature enabled, logs how long
/// it took.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let started_at = std::time::Instant::now();
    let result = f();
    let elapsed = started_at.elapsed();

    log::info!(
        "{label}: {}",
        humantime::format_duration(std::time::Duration::from_micros(
            elapsed.as_micros() as u64
        ))
    );

    result
}

#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_: &str, f: impl FnOnce() -> T) -> T {
    f()
}
