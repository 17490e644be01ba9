//! Application settings

use serde::{Deserialize, Serialize};

use crate::viewport::snap::SNAP_THRESHOLD;

/// Unit system for display. Scene coordinates are always stored in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Meters,
    Millimeters,
    Inches,
    Feet,
}

impl Units {
    /// Get the abbreviation for this unit
    pub fn abbrev(&self) -> &'static str {
        match self {
            Units::Meters => "m",
            Units::Millimeters => "mm",
            Units::Inches => "in",
            Units::Feet => "ft",
        }
    }

    /// Get the display name for this unit
    pub fn display_name(&self) -> &'static str {
        match self {
            Units::Meters => "Meters",
            Units::Millimeters => "Millimeters",
            Units::Inches => "Inches",
            Units::Feet => "Feet",
        }
    }

    /// How many of this unit make one meter
    pub fn per_meter(&self) -> f64 {
        match self {
            Units::Meters => 1.0,
            Units::Millimeters => 1000.0,
            Units::Inches => 1.0 / 0.0254,
            Units::Feet => 1.0 / 0.3048,
        }
    }

    /// Convert a length in meters to this unit
    pub fn from_meters(&self, meters: f64) -> f64 {
        meters * self.per_meter()
    }

    /// Convert a length in this unit back to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        value / self.per_meter()
    }

    /// All available units
    pub fn all() -> &'static [Units] {
        &[Units::Meters, Units::Millimeters, Units::Inches, Units::Feet]
    }
}

/// Which candidate owns an axis when several faces are in range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapOrder {
    /// Nearest candidate (by center distance) wins
    #[default]
    Nearest,
    /// Scene order; the last matching candidate wins
    SceneOrder,
}

/// Face snapping while translating objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapSettings {
    /// Enable snapping
    pub enabled: bool,
    /// Capture distance in meters
    pub threshold: f64,
    #[serde(default)]
    pub order: SnapOrder,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: SNAP_THRESHOLD,
            order: SnapOrder::Nearest,
        }
    }
}

/// Dimension display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSettings {
    /// Show dimension overlays
    pub visible: bool,
    /// Number of decimal places for dimension values
    pub precision: usize,
    /// Show dimension units suffix
    pub show_units: bool,
}

impl Default for DimensionSettings {
    fn default() -> Self {
        Self {
            visible: true,
            precision: 2,
            show_units: true,
        }
    }
}

impl DimensionSettings {
    /// Format a length given in meters in the requested units
    pub fn format_length(&self, meters: f64, units: Units) -> String {
        let value = units.from_meters(meters);
        if self.show_units {
            format!("{:.*} {}", self.precision, value, units.abbrev())
        } else {
            format!("{:.*}", self.precision, value)
        }
    }
}

fn default_server_url() -> String {
    std::env::var("SCENE_COMPOSER_SERVER").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// All application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Display units
    pub units: Units,
    /// Snap settings
    pub snap: SnapSettings,
    /// Dimension display settings
    #[serde(default)]
    pub dimensions: DimensionSettings,
    /// Base URL of the scene generation service
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            units: Units::default(),
            snap: SnapSettings::default(),
            dimensions: DimensionSettings::default(),
            server_url: default_server_url(),
        }
    }
}

impl AppSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "scene-composer", "scene-composer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(json) = std::fs::read_to_string(&path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring malformed settings at {}: {e}", path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("Cannot create config dir {}: {e}", dir.display());
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Failed to save settings: {e}");
                }
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {e}"),
        }
    }
}
