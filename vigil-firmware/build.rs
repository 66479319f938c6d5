//! Build script for vigil-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates board constants into `$OUT_DIR/board.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let config = validate_config();
    generate_board(&config);
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml configuration at compile time
fn validate_config() -> toml::Value {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml description file.           ║\n\
            ║  Please create one in the vigil-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
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
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
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
    validate_required_sections(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_peripherals(&config, &mut errors);
    report("Invalid board configuration", &errors);

    println!("cargo:warning=board.toml validated successfully");
    config
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

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn validate_required_sections(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["board", "display", "gnss", "sound", "battery", "radio"] {
        match config.get(section) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", section)),
            None => errors.push(format!("Missing [{}] section", section)),
        }
    }
    if str_field(config, "board", "name").is_none() {
        errors.push("[board] missing 'name'".to_string());
    }
    match int_field(config, "board", "image_kb") {
        Some(kb) if (64..=1984).contains(&kb) => {}
        Some(_) => errors.push("[board] image_kb must be 64-1984".to_string()),
        None => errors.push("[board] missing 'image_kb'".to_string()),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    match str_field(config, "display", "model") {
        Some(model) if panel_variant(model).is_some() => {}
        Some(model) => errors.push(format!("[display] unknown model '{}'", model)),
        None => errors.push("[display] missing 'model'".to_string()),
    }
    match int_field(config, "display", "rotation") {
        Some(0 | 90 | 180 | 270) => {}
        Some(_) => errors.push("[display] rotation must be 0, 90, 180 or 270".to_string()),
        None => errors.push("[display] missing 'rotation'".to_string()),
    }
    match int_field(config, "display", "refresh_interval_ms") {
        Some(ms) if (500..=60_000).contains(&ms) => {}
        Some(_) => errors.push("[display] refresh_interval_ms must be 500-60000".to_string()),
        None => errors.push("[display] missing 'refresh_interval_ms'".to_string()),
    }
}

fn validate_peripherals(config: &toml::Value, errors: &mut Vec<String>) {
    match int_field(config, "gnss", "baud") {
        Some(4800 | 9600 | 19200 | 38400 | 57600 | 115200) => {}
        Some(_) => errors.push("[gnss] baud must be a standard NMEA rate".to_string()),
        None => errors.push("[gnss] missing 'baud'".to_string()),
    }
    if bool_field(config, "sound", "buzzer").is_none() {
        errors.push("[sound] missing 'buzzer'".to_string());
    }
    match str_field(config, "battery", "chemistry") {
        Some("nimh2" | "lipo") => {}
        Some(other) => errors.push(format!("[battery] unknown chemistry '{}'", other)),
        None => errors.push("[battery] missing 'chemistry'".to_string()),
    }
    match float_field(config, "battery", "counts_per_volt") {
        Some(v) if v > 0.0 => {}
        Some(_) => errors.push("[battery] counts_per_volt must be positive".to_string()),
        None => errors.push("[battery] missing 'counts_per_volt'".to_string()),
    }
    match str_field(config, "radio", "chip") {
        Some(chip) if radio_variant(chip).is_some() => {}
        Some(chip) => errors.push(format!("[radio] unknown chip '{}'", chip)),
        None => errors.push("[radio] missing 'chip'".to_string()),
    }
    if bool_field(config, "radio", "reset_wired").is_none() {
        errors.push("[radio] missing 'reset_wired'".to_string());
    }
}

fn field<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section)?.get(key)
}

fn str_field<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a str> {
    field(config, section, key)?.as_str()
}

fn int_field(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    field(config, section, key)?.as_integer()
}

fn bool_field(config: &toml::Value, section: &str, key: &str) -> Option<bool> {
    field(config, section, key)?.as_bool()
}

fn float_field(config: &toml::Value, section: &str, key: &str) -> Option<f64> {
    match field(config, section, key)? {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn panel_variant(model: &str) -> Option<&'static str> {
    match model {
        "none" => Some("Generic"),
        "depg0213bn" => Some("Depg0213bn"),
        "gdey0213b74" => Some("Gdey0213b74"),
        "gdeh0154d67" => Some("Gdeh0154d67"),
        _ => None,
    }
}

fn radio_variant(chip: &str) -> Option<&'static str> {
    match chip {
        "none" => Some("None"),
        "nrf905" => Some("Nrf905"),
        "sx1276" => Some("Sx1276"),
        "sx1262" => Some("Sx1262"),
        "cc13xx" => Some("Cc13xx"),
        "uat978" => Some("Uat978"),
        _ => None,
    }
}

/// Emit the validated values as Rust constants
fn generate_board(config: &toml::Value) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let name = str_field(config, "board", "name").unwrap_or("Vigil");
    let image_kb = int_field(config, "board", "image_kb").unwrap_or(1024);
    let model = str_field(config, "display", "model")
        .and_then(panel_variant)
        .unwrap_or("Generic");
    let rotation = match int_field(config, "display", "rotation").unwrap_or(0) {
        90 => "Deg90",
        180 => "Deg180",
        270 => "Deg270",
        _ => "Deg0",
    };
    let interval = int_field(config, "display", "refresh_interval_ms").unwrap_or(2000);
    let baud = int_field(config, "gnss", "baud").unwrap_or(9600);
    let buzzer = bool_field(config, "sound", "buzzer").unwrap_or(false);
    let chemistry = match str_field(config, "battery", "chemistry") {
        Some("lipo") => "LiPo",
        _ => "NiMhX2",
    };
    let counts_per_volt = float_field(config, "battery", "counts_per_volt").unwrap_or(1.0);
    let radio = str_field(config, "radio", "chip")
        .and_then(radio_variant)
        .unwrap_or("None");
    let reset_wired = bool_field(config, "radio", "reset_wired").unwrap_or(true);

    let code = format!(
        "// Generated from board.toml by build.rs\n\
         pub const BOARD_NAME: &str = {name:?};\n\
         pub const IMAGE_BYTES: u32 = {image} * 1024;\n\
         pub const DISPLAY_MODEL: vigil_display::PanelModel = vigil_display::PanelModel::{model};\n\
         pub const DISPLAY_ROTATION: vigil_display::Rotation = vigil_display::Rotation::{rotation};\n\
         pub const REFRESH_INTERVAL_MS: u32 = {interval};\n\
         pub const GNSS_BAUD: u32 = {baud};\n\
         pub const BUZZER_PRESENT: bool = {buzzer};\n\
         pub const BATTERY: vigil_core::battery::BatteryConfig = vigil_core::battery::BatteryConfig {{\n    \
             chemistry: vigil_core::battery::Chemistry::{chemistry},\n    \
             counts_per_volt: {counts_per_volt:?},\n\
         }};\n\
         pub const RADIO: vigil_drivers::radio::RadioConfig = vigil_drivers::radio::RadioConfig {{\n    \
             chip: vigil_drivers::radio::RadioChip::{radio},\n    \
             reset_wired: {reset_wired},\n\
         }};\n",
        image = image_kb,
    );

    let mut f = File::create(out_dir.join("board.rs")).unwrap();
    f.write_all(code.as_bytes()).unwrap();
}
