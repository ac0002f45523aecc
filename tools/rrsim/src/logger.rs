//! Stderr log backend.
//!
//! Kernel and CLI log records go to stderr as `LEVEL target: message`,
//! keeping stdout free for the trace and the report. `RRSIM_LOG` (e.g.
//! `debug`, `off`) overrides the level picked by `-v`/`-q`.

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable that overrides the verbosity flags.
pub const LOG_ENV: &str = "RRSIM_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Level for the given flags: warnings by default, `-v` for each step
/// up, `-q` for errors only.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Resolve the level, letting a valid `RRSIM_LOG` value win.
pub fn resolve_level(verbose: u8, quiet: bool, env: Option<&str>) -> LevelFilter {
    env.and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| level_from_flags(verbose, quiet))
}

/// Install the logger. Calling it twice leaves the first one in place.
pub fn init(verbose: u8, quiet: bool) {
    let env = std::env::var(LOG_ENV).ok();
    let level = resolve_level(verbose, quiet, env.as_deref());
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_levels() {
        assert_eq!(level_from_flags(0, false), LevelFilter::Warn);
        assert_eq!(level_from_flags(1, false), LevelFilter::Info);
        assert_eq!(level_from_flags(2, false), LevelFilter::Debug);
        assert_eq!(level_from_flags(7, false), LevelFilter::Trace);
        assert_eq!(level_from_flags(3, true), LevelFilter::Error);
    }

    #[test]
    fn env_overrides_flags() {
        assert_eq!(resolve_level(0, false, Some("debug")), LevelFilter::Debug);
        assert_eq!(resolve_level(2, false, Some("off")), LevelFilter::Off);
        // unparsable values fall back to the flags
        assert_eq!(resolve_level(1, false, Some("loud")), LevelFilter::Info);
        assert_eq!(resolve_level(0, true, None), LevelFilter::Error);
    }
}
