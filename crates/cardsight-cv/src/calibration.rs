//! Slot geometry and offline template extraction
//!
//! Given a labeled screenshot and the configured slot geometry, carve each
//! card slot out of a region, crop the identifying corner, and persist it
//! as a catalog entry named after the card code. Runs offline, never as
//! part of the live detection pass.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bbox::BBox;
use crate::config::VisionConfig;
use crate::regions::{Region, ResolvedRegions};

/// How a region subdivides into per-card cells.
///
/// With explicit `w`/`h` the slots are laid out left-to-right from the
/// region origin with `x_spacing` between them; otherwise the region width
/// is divided evenly by the slot count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotGeometry {
    #[serde(rename = "w")]
    pub width: Option<i32>,
    #[serde(rename = "h")]
    pub height: Option<i32>,
    pub x_spacing: i32,
    pub y_spacing: i32,
}

impl SlotGeometry {
    fn explicit(&self) -> Option<(i32, i32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

/// Sub-rectangle of a slot used as the matching signature, relative to the
/// slot origin. Cards are identified by the corner rank/suit glyph, not
/// the full face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerCrop {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "w")]
    pub width: i32,
    #[serde(rename = "h")]
    pub height: i32,
}

impl CornerCrop {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Default for CornerCrop {
    fn default() -> Self {
        Self::new(0, 0, 40, 40)
    }
}

/// Calibration argument problems are reported loudly, never corrected
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("corner_crop must have positive width and height")]
    BadCornerCrop,
    #[error("no hero or board card codes were supplied")]
    NoCodes,
    #[error("{0} is not set in the configuration")]
    RegionUnset(&'static str),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Output options for a template extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub out_dir: PathBuf,
    /// Filename prefix for dumped slot crops ("hero"/"board")
    pub prefix: String,
    /// Replace existing template files; off by default to protect curated
    /// templates during iterative calibration
    pub overwrite: bool,
    /// Additionally write each raw slot crop under `slots/` for inspection
    pub dump_slots: bool,
}

impl ExtractOptions {
    pub fn new(out_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            prefix: prefix.into(),
            overwrite: false,
            dump_slots: false,
        }
    }
}

/// Subdivide `region` into `count` slot boxes.
pub fn slot_boxes(region: Region, count: usize, geometry: &SlotGeometry) -> Vec<BBox> {
    let mut boxes = Vec::with_capacity(count);

    if let Some((w, h)) = geometry.explicit() {
        let mut cur_x = region.x;
        for _ in 0..count {
            boxes.push(BBox::new(cur_x, region.y, w, h));
            cur_x += w + geometry.x_spacing;
        }
        return boxes;
    }

    let slot_w = region.width / count.max(1) as i32;
    for i in 0..count {
        boxes.push(BBox::new(
            region.x + i as i32 * slot_w,
            region.y,
            slot_w,
            region.height,
        ));
    }
    if geometry.y_spacing != 0 {
        for b in &mut boxes {
            b.y += geometry.y_spacing;
            b.height -= geometry.y_spacing;
        }
    }
    boxes
}

fn crop_clamped(image: &DynamicImage, bbox: &BBox) -> DynamicImage {
    let x = bbox.x.clamp(0, image.width() as i32) as u32;
    let y = bbox.y.clamp(0, image.height() as i32) as u32;
    let w = (bbox.right().clamp(0, image.width() as i32) as u32).saturating_sub(x);
    let h = (bbox.bottom().clamp(0, image.height() as i32) as u32).saturating_sub(y);
    image.crop_imm(x, y, w, h)
}

fn save_to(image: &DynamicImage, path: &Path) -> Result<(), CalibrationError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
}

/// Extract one template per code from the slots of `region` and write them
/// to `opts.out_dir` as `<code>.png`, grayscale.
///
/// Existing template files are skipped unless `opts.overwrite` is set.
/// Returns the paths that were written.
pub fn extract_templates(
    image: &DynamicImage,
    region: Region,
    codes: &[String],
    geometry: &SlotGeometry,
    corner: &CornerCrop,
    opts: &ExtractOptions,
) -> Result<Vec<PathBuf>, CalibrationError> {
    if corner.width <= 0 || corner.height <= 0 {
        return Err(CalibrationError::BadCornerCrop);
    }

    let boxes = slot_boxes(region, codes.len(), geometry);
    let mut written = Vec::new();

    for (idx, (code, slot)) in codes.iter().zip(boxes.iter()).enumerate() {
        let slot_crop = crop_clamped(image, slot);
        if opts.dump_slots {
            let slot_path = opts
                .out_dir
                .join("slots")
                .join(format!("{}_{idx}.png", opts.prefix));
            save_to(&slot_crop, &slot_path)?;
        }

        let corner_box = BBox::new(corner.x, corner.y, corner.width, corner.height);
        let glyph = DynamicImage::ImageLuma8(crop_clamped(&slot_crop, &corner_box).to_luma8());

        let out_path = opts.out_dir.join(format!("{code}.png"));
        if out_path.exists() && !opts.overwrite {
            info!("skipping existing template {}", out_path.display());
            continue;
        }
        save_to(&glyph, &out_path)?;
        debug!("wrote template {}", out_path.display());
        written.push(out_path);
    }

    Ok(written)
}

/// Extract templates for the hero and/or board rows using the regions and
/// geometry from `config`. At least one row of codes must be supplied.
pub fn extract_for_config(
    image: &DynamicImage,
    config: &VisionConfig,
    hero_codes: &[String],
    board_codes: &[String],
    out_dir: impl Into<PathBuf>,
    overwrite: bool,
    dump_slots: bool,
) -> Result<Vec<PathBuf>, CalibrationError> {
    if hero_codes.is_empty() && board_codes.is_empty() {
        return Err(CalibrationError::NoCodes);
    }

    let out_dir = out_dir.into();
    let mut written = Vec::new();

    for (name, prefix, codes) in [
        ("hero_region", "hero", hero_codes),
        ("board_region", "board", board_codes),
    ] {
        if codes.is_empty() {
            continue;
        }
        let region = config
            .region(name)
            .ok_or(CalibrationError::RegionUnset(name))?;
        let opts = ExtractOptions {
            out_dir: out_dir.clone(),
            prefix: prefix.to_string(),
            overwrite,
            dump_slots,
        };
        written.extend(extract_templates(
            image,
            region,
            codes,
            &config.card_slot,
            &config.corner_crop,
            &opts,
        )?);
    }

    Ok(written)
}

/// Fixed outline color per region name; this mapping is the only way to
/// tell regions apart on a preview, so keep it stable.
pub const REGION_COLORS: [(&str, [u8; 3]); 6] = [
    ("hero_region", [0, 255, 255]),
    ("board_region", [255, 215, 0]),
    ("pot_region", [255, 99, 71]),
    ("stack_region", [60, 179, 113]),
    ("bet_to_call_region", [147, 112, 219]),
    ("action_region", [255, 255, 255]),
];

/// Draw each resolved region as a colored outline, for the calibration
/// preview command.
///
/// Regions are identified by their `REGION_COLORS` entry rather than an
/// in-image text label (no font is bundled); callers that show the preview
/// to an operator should print the name-to-color legend alongside it.
pub fn render_preview(image: &DynamicImage, regions: &ResolvedRegions) -> image::RgbImage {
    let mut canvas = image.to_rgb8();
    for (name, color) in REGION_COLORS {
        let Some(region) = regions.get(name) else {
            continue;
        };
        if !region.is_valid() {
            continue;
        }
        // three nested outlines for visibility
        for inset in 0..3i32 {
            let w = region.width - 2 * inset;
            let h = region.height - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(region.x + inset, region.y + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut canvas, rect, image::Rgb(color));
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_slot_boxes_explicit_geometry() {
        let geometry = SlotGeometry {
            width: Some(70),
            height: Some(95),
            x_spacing: 10,
            y_spacing: 0,
        };
        let boxes = slot_boxes(Region::new(100, 200, 400, 120), 3, &geometry);
        assert_eq!(
            boxes,
            vec![
                BBox::new(100, 200, 70, 95),
                BBox::new(180, 200, 70, 95),
                BBox::new(260, 200, 70, 95),
            ]
        );
    }

    #[test]
    fn test_slot_boxes_even_division() {
        let boxes = slot_boxes(Region::new(0, 50, 350, 90), 5, &SlotGeometry::default());
        assert_eq!(boxes.len(), 5);
        for (i, b) in boxes.iter().enumerate() {
            assert_eq!(*b, BBox::new(i as i32 * 70, 50, 70, 90));
        }
    }

    #[test]
    fn test_slot_boxes_y_spacing_shrinks_from_top() {
        let geometry = SlotGeometry {
            y_spacing: 8,
            ..Default::default()
        };
        let boxes = slot_boxes(Region::new(0, 50, 140, 90), 2, &geometry);
        assert_eq!(boxes[0], BBox::new(0, 58, 70, 82));
    }

    #[test]
    fn test_slot_boxes_zero_count() {
        assert!(slot_boxes(Region::new(0, 0, 100, 50), 0, &SlotGeometry::default()).is_empty());
    }

    fn screenshot() -> DynamicImage {
        let mut img = RgbImage::from_pixel(300, 200, Rgb([20, 80, 20]));
        // distinct block in the first hero slot corner
        for y in 100..140 {
            for x in 10..50 {
                img.put_pixel(x, y, Rgb([200, 200, 200]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_rejects_bad_corner_crop() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_templates(
            &screenshot(),
            Region::new(10, 100, 140, 90),
            &codes(&["As"]),
            &SlotGeometry::default(),
            &CornerCrop::new(0, 0, 0, 40),
            &ExtractOptions::new(dir.path(), "hero"),
        )
        .unwrap_err();
        assert!(matches!(err, CalibrationError::BadCornerCrop));
    }

    #[test]
    fn test_extract_writes_grayscale_templates() {
        let dir = tempfile::tempdir().unwrap();
        let written = extract_templates(
            &screenshot(),
            Region::new(10, 100, 140, 90),
            &codes(&["As", "Kd"]),
            &SlotGeometry::default(),
            &CornerCrop::default(),
            &ExtractOptions::new(dir.path(), "hero"),
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        assert!(dir.path().join("As.png").exists());
        assert!(dir.path().join("Kd.png").exists());

        let tmpl = image::open(dir.path().join("As.png")).unwrap();
        assert_eq!(tmpl.width(), 40);
        assert_eq!(tmpl.height(), 40);
    }

    #[test]
    fn test_extract_keeps_existing_template_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let curated = GrayImage::from_pixel(8, 8, Luma([123u8]));
        curated.save(dir.path().join("As.png")).unwrap();

        let opts = ExtractOptions::new(dir.path(), "hero");
        let written = extract_templates(
            &screenshot(),
            Region::new(10, 100, 140, 90),
            &codes(&["As"]),
            &SlotGeometry::default(),
            &CornerCrop::default(),
            &opts,
        )
        .unwrap();
        assert!(written.is_empty());
        let kept = image::open(dir.path().join("As.png")).unwrap();
        assert_eq!(kept.width(), 8);

        // with overwrite the curated file is replaced
        let opts = ExtractOptions {
            overwrite: true,
            ..opts
        };
        let written = extract_templates(
            &screenshot(),
            Region::new(10, 100, 140, 90),
            &codes(&["As"]),
            &SlotGeometry::default(),
            &CornerCrop::default(),
            &opts,
        )
        .unwrap();
        assert_eq!(written.len(), 1);
        let replaced = image::open(dir.path().join("As.png")).unwrap();
        assert_eq!(replaced.width(), 40);
    }

    #[test]
    fn test_extract_dump_slots_writes_slot_crops() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExtractOptions {
            dump_slots: true,
            ..ExtractOptions::new(dir.path(), "board")
        };
        extract_templates(
            &screenshot(),
            Region::new(10, 100, 140, 90),
            &codes(&["As", "Kd"]),
            &SlotGeometry::default(),
            &CornerCrop::default(),
            &opts,
        )
        .unwrap();
        assert!(dir.path().join("slots/board_0.png").exists());
        assert!(dir.path().join("slots/board_1.png").exists());
    }

    #[test]
    fn test_extract_for_config_requires_codes_and_regions() {
        let dir = tempfile::tempdir().unwrap();
        let config = VisionConfig::default();
        let img = screenshot();

        let err = extract_for_config(&img, &config, &[], &[], dir.path(), false, false)
            .unwrap_err();
        assert!(matches!(err, CalibrationError::NoCodes));

        let err =
            extract_for_config(&img, &config, &codes(&["As"]), &[], dir.path(), false, false)
                .unwrap_err();
        assert!(matches!(err, CalibrationError::RegionUnset("hero_region")));
    }

    #[test]
    fn test_extract_for_config_writes_both_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VisionConfig::default();
        config.set_region("hero_region", Region::new(10, 100, 140, 90));
        config.set_region("board_region", Region::new(10, 0, 210, 90));

        let written = extract_for_config(
            &screenshot(),
            &config,
            &codes(&["As", "Kd"]),
            &codes(&["2c", "7h", "Jh"]),
            dir.path(),
            false,
            false,
        )
        .unwrap();
        assert_eq!(written.len(), 5);
    }

    #[test]
    fn test_region_colors_cover_every_region_name() {
        use crate::regions::REGION_KEYS;
        for name in REGION_KEYS {
            assert!(
                REGION_COLORS.iter().any(|(n, _)| *n == name),
                "no preview color for {name}"
            );
        }
    }

    #[test]
    fn test_render_preview_marks_region_outline() {
        let regions = ResolvedRegions {
            hero_region: Some(Region::new(10, 20, 50, 30)),
            ..Default::default()
        };
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([0, 0, 0])));
        let preview = render_preview(&img, &regions);
        assert_eq!(*preview.get_pixel(10, 20), Rgb([0, 255, 255]));
        // interior stays untouched
        assert_eq!(*preview.get_pixel(35, 35), Rgb([0, 0, 0]));
    }
}
