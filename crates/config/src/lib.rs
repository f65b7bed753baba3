//! # Config - blockdump runtime settings
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! BLOCKDUMP_BLOOM_BITS   bits per key of the bloom filter policy  (default: 10)
//! BLOCKDUMP_USE_FILTER   consult the filter block on MAYMATCH     (default: "true")
//! BLOCKDUMP_HEX          print keys and values as hex             (default: "false")
//! BLOCKDUMP_LOG          tracing filter directive                 (default: "warn")
//! ```
//!
//! Unparseable values fall back to the default rather than aborting; the
//! tool is a debugging aid and should always start.

/// Environment variable for [`Config::bloom_bits_per_key`].
pub const ENV_BLOOM_BITS: &str = "BLOCKDUMP_BLOOM_BITS";
/// Environment variable for [`Config::use_filter`].
pub const ENV_USE_FILTER: &str = "BLOCKDUMP_USE_FILTER";
/// Environment variable for [`Config::hex_output`].
pub const ENV_HEX: &str = "BLOCKDUMP_HEX";
/// Environment variable for [`Config::log_filter`].
pub const ENV_LOG: &str = "BLOCKDUMP_LOG";

/// Default bloom filter density, matching what table writers use.
pub const DEFAULT_BLOOM_BITS_PER_KEY: usize = 10;

/// Settings for the block inspection tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bits per key the filter block was written with.
    pub bloom_bits_per_key: usize,
    /// When `false`, a filter file is ignored and every lookup may match.
    pub use_filter: bool,
    /// Print keys and values as lowercase hex instead of lossy UTF-8.
    pub hex_output: bool,
    /// `tracing_subscriber::EnvFilter` directive for diagnostics on stderr.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bloom_bits_per_key: DEFAULT_BLOOM_BITS_PER_KEY,
            use_filter: true,
            hex_output: false,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `lookup` returns `None` for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let bloom_bits_per_key = lookup(ENV_BLOOM_BITS)
            .and_then(|v| v.trim().parse().ok())
            .filter(|&bits: &usize| bits > 0)
            .unwrap_or(defaults.bloom_bits_per_key);
        let use_filter = parse_bool(lookup(ENV_USE_FILTER)).unwrap_or(defaults.use_filter);
        let hex_output = parse_bool(lookup(ENV_HEX)).unwrap_or(defaults.hex_output);
        let log_filter = lookup(ENV_LOG)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        Self {
            bloom_bits_per_key,
            use_filter,
            hex_output,
            log_filter,
        }
    }
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off` (case-insensitive).
fn parse_bool(value: Option<String>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
