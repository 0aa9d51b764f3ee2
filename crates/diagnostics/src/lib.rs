//! Diagnostics for the taximart workspace
//!
//! Provides lightweight, configurable logging shared by the library and the CLI.
//!
//! Usage:
//! - Set TAXIMART_LOG=off (default) - no logs
//! - Set TAXIMART_LOG=info - view registrations, query names and row counts
//! - Set TAXIMART_LOG=debug - also the SQL text of every statement

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "TAXIMART_LOG";

static INIT: Once = Once::new();

/// Parse a level name as accepted in `TAXIMART_LOG`.
///
/// Returns `Ok(None)` for "off", `Err` for names that are not levels.
pub fn parse_level(name: &str) -> Result<Option<emit::Level>, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" | "" => Ok(None),
        "debug" => Ok(Some(emit::Level::Debug)),
        "info" => Ok(Some(emit::Level::Info)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "error" => Ok(Some(emit::Level::Error)),
        other => Err(other.to_string()),
    }
}

/// Initialize diagnostics based on the TAXIMART_LOG environment variable
///
/// Call once at application startup. Subsequent calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let (level, unknown) = match parse_level(&log_level) {
            Ok(None) => return,
            Ok(Some(level)) => (level, None),
            Err(name) => (emit::Level::Info, Some(name)),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if let Some(name) = unknown {
            emit::warn!("Unknown TAXIMART_LOG value {value}, using info", value: name);
        }

        // The runtime must outlive every emitter; the process owns it from here.
        std::mem::forget(rt);
    });
}

/// Log basic operations (view registrations, executed queries)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (SQL text, probed schemas)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log warning conditions (config fallbacks, unusual but recoverable input)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures before they are returned to the caller
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), Ok(None));
        assert_eq!(parse_level("DEBUG"), Ok(Some(emit::Level::Debug)));
        assert_eq!(parse_level(" info "), Ok(Some(emit::Level::Info)));
        assert_eq!(parse_level("loud"), Err("loud".to_string()));
    }

    #[test]
    fn test_macros_take_explicit_properties() {
        let view = String::from("borough");
        let count = 3_usize;
        info!("Registered {view} with {count} files", view: view, count: count);
        debug!("Statement for {view}", view: view);
        warn!("Skipped {view}", view: view);
        error!("Failed {view}", view: view);
        assert_eq!(view, "borough");
    }

    #[test]
    fn test_init_is_repeatable() {
        init_diagnostics();
        init_diagnostics();
    }
}
