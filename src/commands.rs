//! Calibration and detection commands built on cardsight-cv

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use cardsight_cv::calibration::{self, CornerCrop, SlotGeometry};
use cardsight_cv::config::VisionConfig;
use cardsight_cv::detection::{CardDetector, DetectorConfig};
use cardsight_cv::regions::{NullProbe, REGION_KEYS, Region, resolve_regions};
use cardsight_cv::template::SharedCatalog;

const DEFAULT_CONFIG_PATH: &str = "data/vision_config.json";
const DEFAULT_TEMPLATE_DIR: &str = "data/templates";

#[derive(Debug, Parser)]
#[command(name = "cardsight", about = "Table vision calibration helpers")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConfigArg {
    /// Path of the vision configuration document
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set a named region in the vision config
    SetRegion {
        #[arg(long)]
        name: String,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
        #[arg(long)]
        w: i32,
        #[arg(long)]
        h: i32,
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Set the corner crop used as the template signature
    SetCorner {
        #[arg(long, default_value_t = 0)]
        x: i32,
        #[arg(long, default_value_t = 0)]
        y: i32,
        #[arg(long, default_value_t = 40)]
        w: i32,
        #[arg(long, default_value_t = 40)]
        h: i32,
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Set card slot sizing for template extraction
    SetSlot {
        #[arg(long)]
        w: Option<i32>,
        #[arg(long)]
        h: Option<i32>,
        #[arg(long, default_value_t = 0)]
        x_spacing: i32,
        #[arg(long, default_value_t = 0)]
        y_spacing: i32,
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Draw configured regions on a screenshot
    Preview {
        #[arg(long)]
        image: PathBuf,
        /// Output path; defaults to preview.png next to the input
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Generate card corner templates from a labeled screenshot
    ExtractTemplates {
        #[arg(long)]
        image: PathBuf,
        /// Hero card codes, e.g. "As Kd" or "As,Kd"
        #[arg(long)]
        hero_cards: Option<String>,
        /// Board card codes, left to right
        #[arg(long)]
        board_cards: Option<String>,
        #[arg(long, default_value = DEFAULT_TEMPLATE_DIR)]
        out: PathBuf,
        #[arg(long)]
        overwrite: bool,
        /// Also write raw slot crops for inspection
        #[arg(long)]
        dump_slots: bool,
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Run card detection on a screenshot and print the result as JSON
    Detect {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = DEFAULT_TEMPLATE_DIR)]
        templates: PathBuf,
        #[arg(long, default_value_t = DetectorConfig::default().match_threshold)]
        threshold: f64,
        #[arg(long, default_value_t = DetectorConfig::default().nms_threshold)]
        nms_threshold: f64,
    },
}

/// Split a card list like "As Kd" or "As,Kd" into codes
fn parse_cards(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or("")
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::SetRegion {
            name,
            x,
            y,
            w,
            h,
            config,
        } => {
            let mut cfg = VisionConfig::load(&config.config);
            if !cfg.set_region(&name, Region::new(x, y, w, h)) {
                bail!("unknown region '{name}'; valid names: {}", REGION_KEYS.join(", "));
            }
            cfg.save(&config.config)?;
            println!("Updated {name} in {}", config.config.display());
        }
        Command::SetCorner {
            x,
            y,
            w,
            h,
            config,
        } => {
            let mut cfg = VisionConfig::load(&config.config);
            cfg.corner_crop = CornerCrop::new(x, y, w, h);
            cfg.save(&config.config)?;
            println!("Updated corner_crop in {}", config.config.display());
        }
        Command::SetSlot {
            w,
            h,
            x_spacing,
            y_spacing,
            config,
        } => {
            let mut cfg = VisionConfig::load(&config.config);
            cfg.card_slot = SlotGeometry {
                width: w,
                height: h,
                x_spacing,
                y_spacing,
            };
            cfg.save(&config.config)?;
            println!("Updated card_slot in {}", config.config.display());
        }
        Command::Preview { image, out, config } => {
            let screenshot = image::open(&image)
                .with_context(|| format!("opening {}", image.display()))?;
            let cfg = VisionConfig::load(&config.config);
            let regions = resolve_regions(&cfg, &NullProbe);

            let preview = calibration::render_preview(&screenshot, &regions);
            let out_path = out.unwrap_or_else(|| image.with_file_name("preview.png"));
            preview
                .save(&out_path)
                .with_context(|| format!("writing {}", out_path.display()))?;
            println!("Wrote preview to {}", out_path.display());
            // outlines carry no text labels, so print the color legend
            for (name, [r, g, b]) in calibration::REGION_COLORS {
                if regions.get(name).is_some() {
                    println!("  {name}: rgb({r}, {g}, {b})");
                }
            }
        }
        Command::ExtractTemplates {
            image,
            hero_cards,
            board_cards,
            out,
            overwrite,
            dump_slots,
            config,
        } => {
            let screenshot = image::open(&image)
                .with_context(|| format!("opening {}", image.display()))?;
            let cfg = VisionConfig::load(&config.config);
            let hero = parse_cards(hero_cards.as_deref());
            let board = parse_cards(board_cards.as_deref());

            let written = calibration::extract_for_config(
                &screenshot,
                &cfg,
                &hero,
                &board,
                &out,
                overwrite,
                dump_slots,
            )?;
            for path in &written {
                println!("Wrote template {}", path.display());
            }
            println!("{} template(s) written to {}", written.len(), out.display());
        }
        Command::Detect {
            image,
            templates,
            threshold,
            nms_threshold,
        } => {
            let screenshot = image::open(&image)
                .with_context(|| format!("opening {}", image.display()))?;
            let catalog = SharedCatalog::load(&templates);
            let detector = CardDetector::new(
                catalog,
                DetectorConfig {
                    match_threshold: threshold,
                    nms_threshold,
                },
            );
            let result = detector.detect(&screenshot);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cards_space_and_comma_separated() {
        assert_eq!(parse_cards(Some("As Kd")), vec!["As", "Kd"]);
        assert_eq!(parse_cards(Some("As,Kd, 2c")), vec!["As", "Kd", "2c"]);
        assert!(parse_cards(Some("  ")).is_empty());
        assert!(parse_cards(None).is_empty());
    }

    #[test]
    fn test_cli_parses_extract_templates() {
        let cli = Cli::try_parse_from([
            "cardsight",
            "extract-templates",
            "--image",
            "shot.png",
            "--hero-cards",
            "As Kd",
            "--overwrite",
        ])
        .unwrap();
        match cli.command {
            Command::ExtractTemplates {
                image,
                hero_cards,
                overwrite,
                ..
            } => {
                assert_eq!(image, PathBuf::from("shot.png"));
                assert_eq!(hero_cards.as_deref(), Some("As Kd"));
                assert!(overwrite);
            }
            other => panic!("parsed wrong command: {other:?}"),
        }
    }
}
