//! Configuration for the terminal front end.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Default `tracing` filter when neither `RUST_LOG` nor `TODO_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "todo=info,todo_app=info,todo_runtime=warn";

/// Front end configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `tracing` `EnvFilter` directives
    pub log_filter: String,
    /// Whether a done item may be moved back to pending
    ///
    /// Off by default: once checked, an item stays done.
    pub allow_reopen: bool,
    /// Text printed before reading each input line
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            allow_reopen: false,
            prompt: "> ".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `RUST_LOG`, then `TODO_LOG` | `log_filter` |
    /// | `TODO_ALLOW_REOPEN` | `allow_reopen` (`1`/`true`/`yes`/`on`) |
    /// | `TODO_PROMPT` | `prompt` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_filter: lookup("RUST_LOG")
                .or_else(|| lookup("TODO_LOG"))
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            allow_reopen: lookup("TODO_ALLOW_REOPEN")
                .and_then(|raw| parse_flag(&raw))
                .unwrap_or(defaults.allow_reopen),
            prompt: lookup("TODO_PROMPT").unwrap_or(defaults.prompt),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
