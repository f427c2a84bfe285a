//! Terminal output for CLI handlers.
//!
//! Human mode prints colored lines and tables. JSON mode prints one JSON
//! document per line on stdout (errors on stderr) so scripts can parse it.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use tabled::{Table, Tabled};

/// Output settings taken from global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    *config_cell().read()
}

/// Apply output settings. Call once before any handler prints.
pub fn configure(config: OutputConfig) {
    *config_cell().write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

/// Print a serializable result. In human mode `render` prints it instead.
pub fn record<T: Serialize>(kind: &str, value: &T, render: impl FnOnce(&T)) {
    let config = read_config();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": value }));
        return;
    }
    if suppressed(config) {
        return;
    }
    render(value);
}

/// Print rows as a table, or as a JSON array in JSON mode.
pub fn table<T, R>(kind: &str, items: &[T], row: impl Fn(&T) -> R, empty: &str)
where
    T: Serialize,
    R: Tabled,
{
    let config = read_config();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": items }));
        return;
    }
    if suppressed(config) {
        return;
    }
    if items.is_empty() {
        println!("  {}", empty.dimmed());
        return;
    }
    let table = Table::new(items.iter().map(row)).to_string();
    println!("{table}");
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    if config.json || suppressed(config) {
        return;
    }
    println!("  {:<12} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    let config = read_config();
    if config.json {
        println!("{}", json!({ "type": "success", "payload": { "message": message } }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!("  {} {}", "✓".green(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

/// Format a point amount in green.
pub fn points(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.green())
}
