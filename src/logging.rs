use std::sync::Once;

use log::LevelFilter;
use once_cell::sync::OnceCell;

static LOG_ONCE: Once = Once::new();
static ACTIVE_LEVEL: OnceCell<LevelFilter> = OnceCell::new();

/// First parseable level of: explicit flag, `AIRCHAR_LOG`, `RUST_LOG`; else info.
fn resolve_level(flag: Option<&str>, airchar: Option<&str>, rust_log: Option<&str>) -> LevelFilter {
    parse_level(flag)
        .or_else(|| parse_level(airchar))
        .or_else(|| parse_level(rust_log))
        .unwrap_or(LevelFilter::Info)
}

fn parse_level(input: Option<&str>) -> Option<LevelFilter> {
    input.and_then(|s| s.trim().parse::<LevelFilter>().ok())
}

/// Initialize the stderr logger based on `AIRCHAR_LOG`/`RUST_LOG`.
///
/// Logs never go to stdout, which may be carrying the command protocol.
/// Safe to call multiple times; the logger is installed on first call.
pub fn init_logging() {
    init_logging_with(None);
}

/// Same as [`init_logging`], but an explicit level (e.g. from a CLI flag) wins
/// over the environment.
pub fn init_logging_with(level: Option<&str>) {
    let airchar = std::env::var("AIRCHAR_LOG").ok();
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = resolve_level(level, airchar.as_deref(), rust_log.as_deref());
    LOG_ONCE.call_once(|| {
        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp_millis()
            .format_module_path(true)
            .format_target(true)
            .init();
        let _ = ACTIVE_LEVEL.set(level);
    });
}

/// Level chosen when logging was initialized, if it was.
pub fn active_level() -> Option<LevelFilter> {
    ACTIVE_LEVEL.get().copied()
}
