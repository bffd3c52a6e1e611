//! Minimal stderr logger behind the `log` facade.
//!
//! Level: `COLCMP_LOG` (error, warn, info, debug, trace, off) if set,
//! otherwise warn raised by one step per `-v`.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

pub const LOG_ENV: &str = "COLCMP_LOG";

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{}] {}",
            record.level().as_str().to_ascii_lowercase(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Level for a `-v` count.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Resolve the level from an optional env value and the `-v` count.
/// An unparseable env value is ignored.
pub fn resolve_level(env_value: Option<&str>, verbose: u8) -> LevelFilter {
    env_value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or_else(|| level_for(verbose))
}

/// Install the logger once. Later calls are no-ops.
pub fn init(verbose: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let level = resolve_level(env_value.as_deref(), verbose);
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
