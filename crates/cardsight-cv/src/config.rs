//! Vision configuration document
//!
//! A JSON file describing table regions and calibration geometry. Present
//! keys are deep-merged over built-in defaults; a missing or unreadable
//! file silently falls back to the defaults so the pipeline can run
//! uncalibrated.

use std::path::Path;

use anyhow::Context;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calibration::{CornerCrop, SlotGeometry};
use crate::regions::Region;

/// Default side length of the corner crop used as the match signature
const DEFAULT_CORNER: CornerCrop = CornerCrop {
    x: 0,
    y: 0,
    width: 40,
    height: 40,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub hero_region: Option<Region>,
    pub board_region: Option<Region>,
    pub pot_region: Option<Region>,
    pub stack_region: Option<Region>,
    pub bet_to_call_region: Option<Region>,
    pub action_region: Option<Region>,
    pub hero_slots: u32,
    pub board_slots: u32,
    pub card_slot: SlotGeometry,
    pub corner_crop: CornerCrop,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            hero_region: None,
            board_region: None,
            pot_region: None,
            stack_region: None,
            bet_to_call_region: None,
            action_region: None,
            hero_slots: 2,
            board_slots: 5,
            card_slot: SlotGeometry::default(),
            corner_crop: DEFAULT_CORNER,
        }
    }
}

impl VisionConfig {
    /// Load configuration from `path`, overlaying present keys on the
    /// defaults. Every failure mode degrades to defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                debug!("config {} not readable: {err}", path.display());
                return Self::default();
            }
        };
        let overlay: Value = match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) | Err(_) => {
                debug!("config {} is not a JSON object, using defaults", path.display());
                return Self::default();
            }
        };

        let mut base = match serde_json::to_value(Self::default()) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        merge_value(&mut base, overlay);

        // Extract field by field so one malformed key degrades only
        // itself; siblings in the same file survive.
        let Value::Object(map) = base else {
            return Self::default();
        };
        let defaults = Self::default();
        Self {
            hero_region: optional_field(&map, "hero_region", path),
            board_region: optional_field(&map, "board_region", path),
            pot_region: optional_field(&map, "pot_region", path),
            stack_region: optional_field(&map, "stack_region", path),
            bet_to_call_region: optional_field(&map, "bet_to_call_region", path),
            action_region: optional_field(&map, "action_region", path),
            hero_slots: field_or(&map, "hero_slots", defaults.hero_slots, path),
            board_slots: field_or(&map, "board_slots", defaults.board_slots, path),
            card_slot: field_or(&map, "card_slot", defaults.card_slot, path),
            corner_crop: field_or(&map, "corner_crop", defaults.corner_crop, path),
        }
    }

    /// Persist as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Look up a region by name, returning it only if it has positive
    /// extent.
    pub fn region(&self, name: &str) -> Option<Region> {
        let region = match name {
            "hero_region" => self.hero_region,
            "board_region" => self.board_region,
            "pot_region" => self.pot_region,
            "stack_region" => self.stack_region,
            "bet_to_call_region" => self.bet_to_call_region,
            "action_region" => self.action_region,
            _ => None,
        };
        region.filter(Region::is_valid)
    }

    /// Set a region by name; unknown names are rejected
    pub fn set_region(&mut self, name: &str, region: Region) -> bool {
        let slot = match name {
            "hero_region" => &mut self.hero_region,
            "board_region" => &mut self.board_region,
            "pot_region" => &mut self.pot_region,
            "stack_region" => &mut self.stack_region,
            "bet_to_call_region" => &mut self.bet_to_call_region,
            "action_region" => &mut self.action_region,
            _ => return false,
        };
        *slot = Some(region);
        true
    }
}

/// Deserialize an optional key, treating a malformed shape (e.g. a region
/// missing its width) the same as an absent one.
fn optional_field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    path: &Path,
) -> Option<T> {
    let value = map.get(key)?.clone();
    match serde_json::from_value::<Option<T>>(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!("config {}: ignoring malformed {key}: {err}", path.display());
            None
        }
    }
}

/// Deserialize a required key, keeping its default on a malformed shape
fn field_or<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    fallback: T,
    path: &Path,
) -> T {
    match map.get(key).cloned().map(serde_json::from_value::<T>) {
        Some(Ok(parsed)) => parsed,
        Some(Err(err)) => {
            debug!("config {}: ignoring malformed {key}: {err}", path.display());
            fallback
        }
        None => fallback,
    }
}

/// Recursively overlay `overlay` onto `base`: objects merge key-wise,
/// everything else (including null) replaces.
fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
