//! Build script for dotbadge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates badge.toml and turns it into a `BadgeConfig` constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let config = validate_config();
    write_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values taken from badge.toml, defaults filled in
struct Settings {
    shutdown_threshold: i64,
    debounce_ms: i64,
    release_timeout_ms: i64,
    refresh_period_us: i64,
    polarity: &'static str,
    termination: &'static str,
    sync_threshold: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shutdown_threshold: 2048,
            debounce_ms: 50,
            release_timeout_ms: 5000,
            refresh_period_us: 256,
            polarity: "ActiveHigh",
            termination: "Length",
            sync_threshold: 42,
        }
    }
}

/// Validate badge.toml configuration at compile time
fn validate_config() -> Settings {
    println!("cargo:rerun-if-changed=badge.toml");

    let config_path = Path::new("badge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: badge.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a badge.toml configuration file.          ║\n\
            ║  Please create one in the dotbadge-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read badge.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in badge.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut settings = Settings::default();
    let mut errors = Vec::new();

    read_int(&config, "power", "shutdown_threshold", 1, 65535, &mut settings.shutdown_threshold, &mut errors);
    read_int(&config, "power", "debounce_ms", 0, 1000, &mut settings.debounce_ms, &mut errors);
    read_int(&config, "power", "release_timeout_ms", 0, 60_000, &mut settings.release_timeout_ms, &mut errors);
    read_int(&config, "display", "refresh_period_us", 64, 10_000, &mut settings.refresh_period_us, &mut errors);
    read_int(&config, "link", "sync_threshold", 1, 65535, &mut settings.sync_threshold, &mut errors);

    if let Some(value) = config.get("display").and_then(|t| t.get("polarity")) {
        match value.as_str() {
            Some("active-high") => settings.polarity = "ActiveHigh",
            Some("active-low") => settings.polarity = "ActiveLow",
            _ => errors.push("[display] polarity must be 'active-high' or 'active-low'".to_string()),
        }
    }

    if let Some(value) = config.get("animation").and_then(|t| t.get("termination")) {
        match value.as_str() {
            Some("length") => settings.termination = "Length",
            Some("null-terminated") => settings.termination = "NullTerminated",
            _ => errors
                .push("[animation] termination must be 'length' or 'null-terminated'".to_string()),
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in badge.toml                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=badge.toml validated successfully");
    settings
}

/// Read an optional integer key and range-check it
fn read_int(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    out: &mut i64,
    errors: &mut Vec<String>,
) {
    let Some(value) = config.get(section).and_then(|t| t.get(key)) else {
        return;
    };
    match value.as_integer() {
        Some(v) if (min..=max).contains(&v) => *out = v,
        Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
        None => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit `BADGE_CONFIG` into OUT_DIR for `include!`
fn write_config(s: &Settings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "pub const BADGE_CONFIG: BadgeConfig = BadgeConfig {{\n\
         \x20   power: PowerConfig {{\n\
         \x20       shutdown_threshold: {},\n\
         \x20       debounce_ms: {},\n\
         \x20       release_timeout_ms: {},\n\
         \x20   }},\n\
         \x20   display: DisplayConfig {{\n\
         \x20       refresh_period_us: {},\n\
         \x20       polarity: Polarity::{},\n\
         \x20   }},\n\
         \x20   animation: AnimationConfig {{\n\
         \x20       termination: Termination::{},\n\
         \x20   }},\n\
         \x20   link: LinkConfig {{\n\
         \x20       sync_threshold: {},\n\
         \x20   }},\n\
         }};\n",
        s.shutdown_threshold,
        s.debounce_ms,
        s.release_timeout_ms,
        s.refresh_period_us,
        s.polarity,
        s.termination,
        s.sync_threshold,
    );
    fs::write(out_dir.join("badge_config.rs"), source).unwrap();
}
