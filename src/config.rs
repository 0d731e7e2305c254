//! Optional TOML configuration: window size, scope theme and output gain.

use std::path::{Path, PathBuf};

use macroquad::color::Color;
use serde::Deserialize;
use thiserror::Error;

use crate::graph::DEFAULT_GAIN;
use crate::scope::{LineStyle, ScopeStyle};

pub const DEFAULT_CONFIG_FILE: &str = "keyscope.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    Color(String),
    #[error("invalid window size {width}x{height}, both sides must be positive")]
    WindowSize { width: i32, height: i32 },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub scope: ScopeConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
}

impl WindowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::WindowSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 360,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub background: String,
    pub center_line_color: String,
    pub center_line_dash: Vec<f32>,
    pub trace_color: String,
    pub trace_dash: Vec<f32>,
    pub line_width: f32,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            background: "#101014".into(),
            center_line_color: "#ffffff".into(),
            center_line_dash: vec![5.0, 2.0],
            trace_color: "#ffffff".into(),
            trace_dash: Vec::new(),
            line_width: 2.0,
        }
    }
}

impl ScopeConfig {
    pub fn style(&self) -> Result<ScopeStyle, ConfigError> {
        Ok(ScopeStyle {
            background: parse_color(&self.background)?,
            center_line: LineStyle {
                color: parse_color(&self.center_line_color)?,
                dash: self.center_line_dash.clone(),
                width: self.line_width,
            },
            trace: LineStyle {
                color: parse_color(&self.trace_color)?,
                dash: self.trace_dash.clone(),
                width: self.line_width,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub gain: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { gain: DEFAULT_GAIN }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.window.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

/// An explicit path must exist; the default file is optional.
pub fn resolve(explicit: Option<PathBuf>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    match explicit {
        Some(path) => Config::load(&path).map(|config| (config, Some(path))),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                Config::load(&path).map(|config| (config, Some(path)))
            } else {
                Ok((Config::default(), None))
            }
        }
    }
}

pub fn parse_color(text: &str) -> Result<Color, ConfigError> {
    let invalid = || ConfigError::Color(text.to_string());
    let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16);
    let r = channel(0).map_err(|_| invalid())?;
    let g = channel(2).map_err(|_| invalid())?;
    let b = channel(4).map_err(|_| invalid())?;
    let a = if hex.len() == 8 {
        channel(6).map_err(|_| invalid())?
    } else {
        u8::MAX
    };
    Ok(Color::from_rgba(r, g, b, a))
}
