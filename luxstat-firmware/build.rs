//! Build script for luxstat-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time and turns it into constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values extracted from device.toml
struct DeviceToml {
    width: i64,
    height: i64,
    border: i64,
    font_size: i64,
    address: i64,
    tick_ms: i64,
    polling_ms: i64,
    keep_alive_timeout_s: i64,
    frequency_hz: i64,
}

/// Validate device.toml configuration at compile time
fn validate_config() -> DeviceToml {
    // Re-run if device.toml changes
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file.         ║\n\
            ║  Please create one in the luxstat-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let display = section(&config, "display", &mut errors);
    let timing = section(&config, "timing", &mut errors);
    let bus = section(&config, "bus", &mut errors);

    let device = DeviceToml {
        width: integer(display, "display", "width", 8..=128, &mut errors),
        height: integer(display, "display", "height", 16..=64, &mut errors),
        border: integer(display, "display", "border", 0..=32, &mut errors),
        font_size: integer(display, "display", "font_size", 6..=32, &mut errors),
        address: integer(display, "display", "address", 0x08..=0x77, &mut errors),
        tick_ms: integer(timing, "timing", "tick_ms", 1..=60_000, &mut errors),
        polling_ms: integer(timing, "timing", "polling_ms", 0..=u32::MAX as i64, &mut errors),
        keep_alive_timeout_s: integer(timing, "timing", "keep_alive_timeout_s", 1..=86_400, &mut errors),
        frequency_hz: integer(bus, "bus", "frequency_hz", 10_000..=1_000_000, &mut errors),
    };

    // SSD1306 drives whole 8-row pages
    if errors.is_empty() && device.height % 8 != 0 {
        errors.push(format!(
            "[display] height {} is not a multiple of 8",
            device.height
        ));
    }

    // The inset must leave room for at least one text row
    if errors.is_empty() {
        let inner = device.height - device.border * 2;
        if device.border * 2 >= device.width || inner < device.font_size + 2 {
            errors.push(format!(
                "[display] border {} leaves no room for a {} px row",
                device.border, device.font_size
            ));
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
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

    println!("cargo:warning=device.toml validated successfully");
    device
}

/// Look up a required table
fn section<'a>(
    config: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::value::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => {
            errors.push(format!("Missing [{}] section", name));
            None
        }
    }
}

/// Look up a required integer and check its range
fn integer(
    table: Option<&toml::value::Table>,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> i64 {
    let Some(table) = table else {
        return 0;
    };
    match table.get(key) {
        Some(toml::Value::Integer(value)) if range.contains(value) => *value,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            0
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
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

/// Write the validated values as Rust constants
fn generate_constants(device: &DeviceToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "// Generated from device.toml by build.rs\n\
         pub const DISPLAY_WIDTH: u32 = {};\n\
         pub const DISPLAY_HEIGHT: u32 = {};\n\
         pub const DISPLAY_BORDER: u32 = {};\n\
         pub const DISPLAY_FONT_SIZE: u32 = {};\n\
         pub const DISPLAY_ADDRESS: u8 = {:#04x};\n\
         pub const TICK_MS: u32 = {};\n\
         pub const POLLING_MS: u32 = {};\n\
         pub const KEEP_ALIVE_TIMEOUT_MS: u64 = {};\n\
         pub const I2C_FREQUENCY_HZ: u32 = {};\n",
        device.width,
        device.height,
        device.border,
        device.font_size,
        device.address,
        device.tick_ms,
        device.polling_ms,
        device.keep_alive_timeout_s * 1000,
        device.frequency_hz,
    );
    fs::write(out_dir.join("device_config.rs"), source).unwrap();
}
