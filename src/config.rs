//! Configuration system for the Shade screen locker
//!
//! Loads configuration from TOML file at `~/.config/shade/config.toml`
//! Auto-generates default config file on first run if missing.
//!
//! Also owns the background color model: colors are written as six hex
//! digits with no leading `#` (e.g. `"1f1f28"`) and parsed into 8-bit
//! channels before any rendering code sees them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub indicator: IndicatorConfig,
    pub background: BackgroundConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indicator: IndicatorConfig::default(),
            background: BackgroundConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("shade");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let default_config = Self::default();
        let toml_string = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Unlock indicator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Show the password-progress indicator at all
    pub enabled: bool,
    /// Monitor index to center the indicator on; negative = no preference
    pub show_on_screen: i32,
    /// DPI override; when unset the DPI is derived from the root screen's
    /// physical dimensions
    pub dpi: Option<f64>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_on_screen: -1,
            dpi: None,
        }
    }
}

/// Lock screen background configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Fill color as six hex digits, no leading `#` (e.g. "1f1f28")
    pub color: String,
    /// Optional image painted over the fill color
    pub image: Option<PathBuf>,
    /// Repeat the image to cover the whole screen instead of painting it
    /// once at the origin
    pub tile: bool,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: "000000".to_string(),
            image: None,
            tile: false,
        }
    }
}

/// A fully-parsed background/indicator color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels normalized to the 0.0-1.0 range
    pub fn normalized(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }

    /// Packed ARGB32 pixel value (fully opaque)
    pub fn argb(&self) -> u32 {
        0xff00_0000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Parse a six-hex-digit color string into 8-bit channels.
///
/// A malformed or missing two-digit group degrades to 0 for that channel
/// rather than failing; the lock screen must come up even on a bad config.
pub fn parse_hex_color(color: &str) -> Rgb {
    let channel = |start: usize| -> u8 {
        let group = color.get(start..start + 2).unwrap_or("");
        match u8::from_str_radix(group, 16) {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "invalid hex group {:?} in color {:?}, defaulting channel to 00",
                    group, color
                );
                0
            }
        }
    };

    Rgb {
        r: channel(0),
        g: channel(2),
        b: channel(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primary_colors() {
        assert_eq!(parse_hex_color("ff0000").normalized(), (1.0, 0.0, 0.0));
        assert_eq!(parse_hex_color("00ff00").normalized(), (0.0, 1.0, 0.0));
        assert_eq!(parse_hex_color("0000ff").normalized(), (0.0, 0.0, 1.0));
    }

    #[test]
    fn test_parse_mixed_color() {
        assert_eq!(parse_hex_color("1f1f28"), Rgb::new(0x1f, 0x1f, 0x28));
        assert_eq!(parse_hex_color("FFFFFF"), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_malformed_group_defaults_to_black() {
        // Only the malformed group degrades, not the whole color
        assert_eq!(parse_hex_color("ffzzff"), Rgb::new(255, 0, 255));
        assert_eq!(parse_hex_color("zzzzzz"), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_short_string_degrades() {
        assert_eq!(parse_hex_color("ff"), Rgb::new(255, 0, 0));
        assert_eq!(parse_hex_color(""), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_argb_packing() {
        assert_eq!(parse_hex_color("ff0000").argb(), 0xffff_0000);
        assert_eq!(parse_hex_color("000000").argb(), 0xff00_0000);
    }
}
