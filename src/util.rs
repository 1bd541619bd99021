//! Small shared utilities: logging setup.

use log::LogLevelFilter;

/// Initialize the global logger at the given verbosity. Safe to call once
/// per process; a second call is a no-op (env_logger ignores repeat init).
pub fn init_logging(level: LogLevelFilter) {
    let mut builder = env_logger::LogBuilder::new();
    builder.filter(None, level);
    if std::env::var("RUST_LOG").is_ok() {
        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse(&spec);
        }
    }
    let _ = builder.init();
}
