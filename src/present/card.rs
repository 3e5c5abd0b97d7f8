//! Result card export: a 4:5 PNG plus a JSON sidecar of the analysis.
//!
//! Layout, in base units before the pixel ratio is applied:
//!
//! ```text
//! ┌──────────── 400 ────────────┐
//! │                             │
//! │  photo, letterboxed (300)   │
//! │                             │
//! ├─────────────────────────────┤
//! │   ▇▇      ▇▇      ▇▇        │  bars: CO2, cost, value
//! │   ▇▇      ▇▇      ▇▇        │
//! │        ───────────          │  divider
//! └─────────────────────────────┘  500
//! ```

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use upcycle_scale::presets::{build_plan, AspectMode, ScaleTarget, Size};

use crate::error::{UpcycleError, UpcycleResult};
use crate::impact::{Condition, ImpactCalculator, ImpactEstimate, PROFILES};
use crate::photo::resize_rgb;
use crate::session::AnalysisResult;

pub const DEFAULT_CARD_FILE: &str = "upcycle-impact.png";

const BASE_WIDTH: u32 = 400;
const BASE_HEIGHT: u32 = 500;
const PHOTO_HEIGHT: u32 = 300;
const BAR_WIDTH: u32 = 48;
const BAR_TOP: u32 = 330;
const BAR_BASELINE: u32 = 440;
const DIVIDER_Y: u32 = 462;
const DIVIDER_MARGIN: u32 = 50;

const BACKGROUND: [u8; 3] = [0x1F, 0x29, 0x37];
const PHOTO_BACKGROUND: [u8; 3] = [0x37, 0x41, 0x51];
const DIVIDER: [u8; 3] = [0x4B, 0x55, 0x63];
const TRACK: [u8; 3] = [0x2B, 0x35, 0x44];
const GREEN: [u8; 3] = [0x4A, 0xDE, 0x80];
const YELLOW: [u8; 3] = [0xFA, 0xCC, 0x15];
const BLUE: [u8; 3] = [0x60, 0xA5, 0xFA];

/// Canvas geometry for a given pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub pixel_ratio: u32,
}

impl CardLayout {
    pub fn new(pixel_ratio: u32) -> Self {
        Self {
            pixel_ratio: pixel_ratio.max(1),
        }
    }

    pub fn size(&self) -> Size {
        Size {
            w: BASE_WIDTH * self.pixel_ratio,
            h: BASE_HEIGHT * self.pixel_ratio,
        }
    }

    pub fn photo_box(&self) -> Size {
        Size {
            w: BASE_WIDTH * self.pixel_ratio,
            h: PHOTO_HEIGHT * self.pixel_ratio,
        }
    }

    fn px(&self, base: u32) -> u32 {
        base * self.pixel_ratio
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Largest figures any catalogue entry can reach under one policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogueMaxima {
    pub co2_saved_kg: f64,
    pub community_cost_avoided: f64,
    pub value_created: f64,
}

impl CatalogueMaxima {
    pub fn for_calculator(calculator: &ImpactCalculator) -> Self {
        let conditions = std::iter::once(None).chain(Condition::ALL.into_iter().map(Some));
        let estimates: Vec<ImpactEstimate> = conditions
            .flat_map(|condition| PROFILES.iter().map(move |p| calculator.compute_for(p, condition)))
            .collect();

        let max = |f: fn(&ImpactEstimate) -> f64| {
            estimates.iter().map(f).fold(1.0_f64, f64::max)
        };
        Self {
            co2_saved_kg: max(|e| e.co2_saved_kg),
            community_cost_avoided: max(|e| e.community_cost_avoided),
            value_created: max(|e| e.value_created),
        }
    }

    /// Bar fill fractions in `[0, 1]`; negative values draw an empty bar.
    pub fn fractions(&self, impact: &ImpactEstimate) -> [f64; 3] {
        [
            (impact.co2_saved_kg / self.co2_saved_kg).clamp(0.0, 1.0),
            (impact.community_cost_avoided / self.community_cost_avoided).clamp(0.0, 1.0),
            (impact.value_created / self.value_created).clamp(0.0, 1.0),
        ]
    }
}

/// Draw the card for one result.
pub fn render_card(
    photo: &RgbImage,
    impact: &ImpactEstimate,
    maxima: &CatalogueMaxima,
    layout: CardLayout,
) -> UpcycleResult<RgbImage> {
    let size = layout.size();
    let mut canvas = RgbImage::from_pixel(size.w, size.h, Rgb(BACKGROUND));

    let plan = build_plan(
        Size {
            w: photo.width(),
            h: photo.height(),
        },
        ScaleTarget::Exact(layout.photo_box()),
        AspectMode::Pad {
            bg_rgb: PHOTO_BACKGROUND,
        },
    );
    let framed = resize_rgb(photo, &plan)?;
    image::imageops::replace(&mut canvas, &framed, 0, 0);

    let column = size.w / 3;
    let bar_w = layout.px(BAR_WIDTH);
    let track_h = layout.px(BAR_BASELINE - BAR_TOP);
    let baseline = layout.px(BAR_BASELINE);
    for (i, (fraction, color)) in maxima
        .fractions(impact)
        .into_iter()
        .zip([GREEN, YELLOW, BLUE])
        .enumerate()
    {
        let x = column * i as u32 + (column - bar_w) / 2;
        fill_rect(&mut canvas, x, baseline - track_h, bar_w, track_h, TRACK);
        let bar_h = (track_h as f64 * fraction).round() as u32;
        fill_rect(&mut canvas, x, baseline - bar_h, bar_w, bar_h, color);
    }

    let margin = layout.px(DIVIDER_MARGIN);
    fill_rect(
        &mut canvas,
        margin,
        layout.px(DIVIDER_Y),
        size.w - 2 * margin,
        layout.pixel_ratio,
        DIVIDER,
    );
    Ok(canvas)
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, Rgb(color));
        }
    }
}

/// Paths written by [`export_card`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardExport {
    pub png_path: PathBuf,
    pub json_path: PathBuf,
}

/// Render the card to `path` (PNG) and write the result next to it as JSON.
pub fn export_card(
    result: &AnalysisResult,
    photo: &RgbImage,
    calculator: &ImpactCalculator,
    layout: CardLayout,
    path: &Path,
) -> UpcycleResult<CardExport> {
    let maxima = CatalogueMaxima::for_calculator(calculator);
    let card = render_card(photo, &result.impact, &maxima, layout)?;
    card.save_with_format(path, ImageFormat::Png)
        .map_err(|e| match e {
            image::ImageError::IoError(source) => {
                UpcycleError::io("write_card", source).with_path(path.display().to_string())
            }
            other => other.into(),
        })?;

    let json_path = path.with_extension("json");
    let json = serde_json::to_vec_pretty(result)
        .map_err(|e| UpcycleError::image("export_card", format!("cannot serialize result: {}", e)))?;
    std::fs::write(&json_path, json).map_err(|e| {
        UpcycleError::io("write_sidecar", e).with_path(json_path.display().to_string())
    })?;

    tracing::info!(png = %path.display(), json = %json_path.display(), "card exported");
    Ok(CardExport {
        png_path: path.to_path_buf(),
        json_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::CostPolicy;

    fn photo(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([200, 120, 60]))
    }

    #[test]
    fn test_layout_is_four_by_five() {
        let size = CardLayout::default().size();
        assert_eq!((size.w, size.h), (800, 1000));
        assert_eq!(CardLayout::new(0).size(), CardLayout::new(1).size());
    }

    #[test]
    fn test_maxima_come_from_catalogue() {
        let maxima = CatalogueMaxima::for_calculator(&ImpactCalculator::with_policy(CostPolicy::Flat));
        assert_eq!(maxima.co2_saved_kg, 245.0);
        assert_eq!(maxima.community_cost_avoided, 96.0);
        assert_eq!(maxima.value_created, 480.0);
    }

    #[test]
    fn test_fractions_are_clamped() {
        let maxima = CatalogueMaxima {
            co2_saved_kg: 100.0,
            community_cost_avoided: 10.0,
            value_created: 50.0,
        };
        let impact = ImpactEstimate {
            co2_saved_kg: 50.0,
            community_cost_avoided: 20.0,
            value_created: -5.0,
        };
        assert_eq!(maxima.fractions(&impact), [0.5, 1.0, 0.0]);
    }

    #[test]
    fn test_wide_photo_is_letterboxed() {
        let layout = CardLayout::new(1);
        let maxima = CatalogueMaxima::for_calculator(&ImpactCalculator::default());
        let impact = ImpactCalculator::default().compute("fabric sofa", None);
        let card = render_card(&photo(800, 200), &impact, &maxima, layout).unwrap();

        assert_eq!(card.dimensions(), (400, 500));
        // 800x200 fits as 400x100, centred vertically in the 300px photo box.
        assert_eq!(card.get_pixel(200, 10).0, PHOTO_BACKGROUND);
        let centre = card.get_pixel(200, 150).0;
        for (got, want) in centre.iter().zip([200u8, 120, 60]) {
            assert!(got.abs_diff(want) <= 1, "{:?}", centre);
        }
        assert_eq!(card.get_pixel(5, 490).0, BACKGROUND);
        assert_eq!(card.get_pixel(200, DIVIDER_Y).0, DIVIDER);
    }

    #[test]
    fn test_full_bar_reaches_the_top_of_its_track() {
        let layout = CardLayout::new(1);
        let maxima = CatalogueMaxima::for_calculator(&ImpactCalculator::default());
        let impact = ImpactCalculator::default().compute("fabric sofa", None);
        let card = render_card(&photo(10, 10), &impact, &maxima, layout).unwrap();

        let x = (400 / 3 - BAR_WIDTH) / 2 + 1;
        assert_eq!(card.get_pixel(x, BAR_TOP).0, GREEN);
        assert_eq!(card.get_pixel(x, BAR_BASELINE - 1).0, GREEN);
    }
}
