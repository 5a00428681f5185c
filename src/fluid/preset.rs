//! Named parameter presets, loadable from JSON.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::FluidResult;
use super::params::SimParams;

/// A named parameter set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimPreset {
    pub name: String,
    pub params: SimParams,
}

impl SimPreset {
    pub fn new(name: impl Into<String>, params: SimParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Presets available to the app, with a cursor for cycling.
#[derive(Resource, Clone, Debug)]
pub struct PresetLibrary {
    pub presets: Vec<SimPreset>,
    pub current: usize,
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self {
            presets: builtin_presets(),
            current: 0,
        }
    }
}

impl PresetLibrary {
    /// Load presets from `path`, falling back to the built-in set when the
    /// file is missing or unreadable.
    pub fn load_or_builtin(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let presets = match load_presets(path) {
            Ok(presets) if !presets.is_empty() => presets,
            Ok(_) => {
                warn!("Preset file {} is empty, using built-in presets", path.display());
                builtin_presets()
            }
            Err(err) => {
                debug!("No presets from {}: {err}", path.display());
                builtin_presets()
            }
        };
        Self {
            presets,
            current: 0,
        }
    }

    pub fn current_preset(&self) -> Option<&SimPreset> {
        self.presets.get(self.current)
    }

    /// Advance to the next preset, wrapping around.
    pub fn next(&mut self) -> Option<&SimPreset> {
        if !self.presets.is_empty() {
            self.current = (self.current + 1) % self.presets.len();
        }
        self.current_preset()
    }
}

/// Water, sand and viscous presets.
pub fn builtin_presets() -> Vec<SimPreset> {
    vec![
        SimPreset::new("Water", SimParams::water()),
        SimPreset::new("Sand", SimParams::sand()),
        SimPreset::new("Viscous", SimParams::viscous()),
    ]
}

/// Read a JSON array of presets. Presets whose parameters fail validation
/// are skipped.
pub fn load_presets(path: impl AsRef<Path>) -> FluidResult<Vec<SimPreset>> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    let presets: Vec<SimPreset> = serde_json::from_str(&data)?;

    let total = presets.len();
    let valid: Vec<SimPreset> = presets
        .into_iter()
        .filter(|preset| match preset.params.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!("Skipping preset '{}': {err}", preset.name);
                false
            }
        })
        .collect();

    info!("Loaded {}/{} presets from {}", valid.len(), total, path.display());
    Ok(valid)
}

/// Write presets as pretty-printed JSON.
pub fn save_presets(path: impl AsRef<Path>, presets: &[SimPreset]) -> FluidResult<()> {
    let json = serde_json::to_string_pretty(presets)?;
    std::fs::write(path, json)?;
    Ok(())
}
