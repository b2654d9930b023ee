//! Terminal output for CLI handlers.
//!
//! Human-readable lines with colored symbols, or one JSON object per line
//! in `--json` mode. `--quiet` suppresses everything but warnings, errors
//! and command results.

use std::fmt::Display;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::json;

/// Output settings taken from the global CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    /// 0 = normal, 1+ = increasingly verbose.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: RwLock<OutputConfig> = RwLock::new(OutputConfig::new(false, false, 0));

fn read_config() -> OutputConfig {
    *OUTPUT_CONFIG.read()
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Apply output settings; call once before any handler runs.
pub fn configure(config: OutputConfig) {
    *OUTPUT_CONFIG.write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    read_config().verbose
}

/// Print the application name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("header", json!({ "app": "lmsr-markets", "version": version }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("{} {}", "lmsr-markets".bold(), version.dimmed());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {:<16} {}", label.dimmed(), value);
}

pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    if is_json() {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }

    eprintln!("  {} {}", "×".red(), message);
}

pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!();
    println!("{}", title.bold());
}

pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {}", message.dimmed());
}

/// Print one replayed scenario step.
pub fn step(index: usize, time: i64, action: &str, ok: bool, detail: &str) {
    let config = read_config();

    if config.json {
        emit_json_line(
            "step",
            json!({
                "index": index,
                "time": time,
                "action": action,
                "ok": ok,
                "detail": detail,
            }),
        );
        return;
    }
    if suppressed(config) && ok {
        return;
    }

    let mark = if ok {
        format!("{}", "✓".green())
    } else {
        format!("{}", "×".red())
    };
    println!(
        "  {mark} {:>3} {} {:<14} {}",
        index,
        time.to_string().dimmed(),
        action.cyan(),
        detail
    );
}

/// Color a value cyan outside JSON mode.
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.cyan())
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("lines", json!({ "content": content }));
        return;
    }
    if suppressed(config) {
        return;
    }

    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a complete JSON document for a command result.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}
