//! Named screenshot regions and their resolution order
//!
//! Each region is a semantically named sub-area of the table screenshot.
//! Resolution prefers explicit configuration, then a UI-derived bounding
//! box for the card rows, then a static fallback. An unresolved region is
//! not an error; consumers skip the corresponding feature.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::config::VisionConfig;

/// The recognized region names, in the order they are reported
pub const REGION_KEYS: [&str; 6] = [
    "hero_region",
    "board_region",
    "pot_region",
    "stack_region",
    "bet_to_call_region",
    "action_region",
];

/// Static fallbacks used when neither config nor the UI yields a region.
/// None until a deployment pins a fixed table layout.
pub const HERO_REGION_FALLBACK: Option<Region> = None;
pub const BOARD_REGION_FALLBACK: Option<Region> = None;

/// Rectangular sub-area of a screenshot, `{x, y, w, h}` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "w")]
    pub width: i32,
    #[serde(rename = "h")]
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region is usable only with positive extent
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn to_bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.width, self.height)
    }
}

/// External UI collaborator that can report bounding boxes for known
/// anchor elements (e.g. the DOM nodes holding the card rows).
pub trait UiProbe {
    fn bounding_box(&self, anchor: &str) -> Option<Region>;
}

/// Probe for headless or offline runs: never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl UiProbe for NullProbe {
    fn bounding_box(&self, _anchor: &str) -> Option<Region> {
        None
    }
}

/// All six regions after resolution; any of them may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedRegions {
    pub hero_region: Option<Region>,
    pub board_region: Option<Region>,
    pub pot_region: Option<Region>,
    pub stack_region: Option<Region>,
    pub bet_to_call_region: Option<Region>,
    pub action_region: Option<Region>,
}

impl ResolvedRegions {
    pub fn get(&self, name: &str) -> Option<Region> {
        match name {
            "hero_region" => self.hero_region,
            "board_region" => self.board_region,
            "pot_region" => self.pot_region,
            "stack_region" => self.stack_region,
            "bet_to_call_region" => self.bet_to_call_region,
            "action_region" => self.action_region,
            _ => None,
        }
    }

    /// Iterate the regions in `REGION_KEYS` order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<Region>)> + '_ {
        REGION_KEYS.iter().map(|&name| (name, self.get(name)))
    }
}

fn probe_anchor(probe: &dyn UiProbe, anchor: &str) -> Option<Region> {
    let region = probe.bounding_box(anchor).filter(Region::is_valid);
    if region.is_none() {
        debug!("no usable bounding box for anchor {anchor}");
    }
    region
}

/// Resolve every recognized region: config first, then (for the two card
/// rows) the UI probe, then the static fallback. Invalid shapes at any
/// stage fall through to the next.
pub fn resolve_regions(config: &VisionConfig, probe: &dyn UiProbe) -> ResolvedRegions {
    let hero_region = config
        .region("hero_region")
        .or_else(|| probe_anchor(probe, "#hero"))
        .or(HERO_REGION_FALLBACK);
    let board_region = config
        .region("board_region")
        .or_else(|| probe_anchor(probe, "#board"))
        .or(BOARD_REGION_FALLBACK);

    ResolvedRegions {
        hero_region,
        board_region,
        pot_region: config.region("pot_region"),
        stack_region: config.region("stack_region"),
        bet_to_call_region: config.region("bet_to_call_region"),
        action_region: config.region("action_region"),
    }
}
