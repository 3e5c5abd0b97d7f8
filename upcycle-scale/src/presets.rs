// SPDX-License-Identifier: MIT
//! # Photo Plans
//!
//! The scaling system is built around three concepts:
//! 1. **ScaleTarget**: What size constraint to apply (max side length vs exact box)
//! 2. **AspectMode**: What happens when the photo's shape differs from the target's
//! 3. **ScalePlan**: The computed output size and, when padding, the content rectangle
//!
//! Plans never upscale: a photo already smaller than the target keeps its size.
//! Dimensions are clamped to at least 1px.

/// Pixel dimensions of a photo or canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Shape handling when a photo does not match its target box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectMode {
    /// Keep the photo's proportions; the output is no larger than the target.
    Preserve,
    /// Letterbox: keep the aspect ratio and fill the remaining canvas with `bg_rgb`.
    /// Only an `Exact` target has a canvas to fill; with `MaxLongSide` it acts
    /// like `Preserve`.
    Pad { bg_rgb: [u8; 3] },
}

/// Size limit a plan must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleTarget {
    /// Longest side at most this many pixels.
    MaxLongSide(u32),
    /// Fit into an exact box (used with `AspectMode::Pad` for card layouts).
    Exact(Size),
}

/// Resolved output geometry for one photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Source photo size
    pub input: Size,
    /// Limit the plan was computed for
    pub target: ScaleTarget,
    /// Shape handling
    pub aspect: AspectMode,
    /// Size of the buffer to render into
    pub out: Size,
    /// If padding is used, the sub-rectangle `(x, y, w, h)` receiving the photo.
    pub dst_roi: Option<(u32, u32, u32, u32)>,
}

impl ScalePlan {
    /// Byte length of an RGB8 buffer holding the planned output.
    pub fn out_len(&self) -> usize {
        (self.out.w as usize) * (self.out.h as usize) * 3
    }

    /// True when the plan leaves the pixels untouched.
    pub fn is_identity(&self) -> bool {
        self.dst_roi.is_none() && self.out == self.input
    }
}

/// Resolve the output geometry for a photo of size `input`.
pub fn build_plan(input: Size, target: ScaleTarget, aspect: AspectMode) -> ScalePlan {
    let (out, dst_roi) = match (target, aspect) {
        (ScaleTarget::MaxLongSide(max_side), _) => {
            let (w, h) = fit_preserve(input, max_side);
            (Size { w, h }, None)
        }
        (ScaleTarget::Exact(out), AspectMode::Preserve) => {
            let (w, h) = fit_within(input, clamp_size(out));
            (Size { w, h }, None)
        }
        (ScaleTarget::Exact(out), AspectMode::Pad { .. }) => {
            let out = clamp_size(out);
            let (rw, rh) = fit_within(input, out);
            (out, Some(((out.w - rw) / 2, (out.h - rh) / 2, rw, rh)))
        }
    };

    ScalePlan {
        input,
        target,
        aspect,
        out,
        dst_roi,
    }
}

fn clamp_size(size: Size) -> Size {
    Size {
        w: size.w.max(1),
        h: size.h.max(1),
    }
}

/// Clamp the longest side to `max_long`, scaling the other side proportionally.
/// Never upscales.
fn fit_preserve(input: Size, max_long: u32) -> (u32, u32) {
    let (w, h) = (input.w.max(1) as f64, input.h.max(1) as f64);
    let long = w.max(h);
    let s = (max_long.max(1) as f64 / long).min(1.0);
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Fit within a bounding box while preserving aspect ratio. Never upscales.
fn fit_within(input: Size, box_: Size) -> (u32, u32) {
    let (w, h) = (input.w.max(1) as f64, input.h.max(1) as f64);
    let (bw, bh) = (box_.w as f64, box_.h as f64);
    let s = (bw / w).min(bh / h).min(1.0);
    (
        ((w * s).round() as u32).clamp(1, box_.w),
        ((h * s).round() as u32).clamp(1, box_.h),
    )
}

/// Longest-side presets for the photo sent to the classifier.
///
/// Furniture is large and visually distinctive; `Large` is plenty for
/// material and wear detection while keeping the upload well under a megabyte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PhotoPreset {
    /// 512px longest side, fastest upload
    Small,
    /// 768px longest side
    Medium,
    /// 1024px longest side
    #[default]
    Large,
}

impl PhotoPreset {
    /// Longest side in pixels for this preset.
    pub fn max_long_side(self) -> u32 {
        match self {
            PhotoPreset::Small => 512,
            PhotoPreset::Medium => 768,
            PhotoPreset::Large => 1024,
        }
    }

    /// Target handed to [`build_plan`].
    pub fn to_target(self) -> ScaleTarget {
        ScaleTarget::MaxLongSide(self.max_long_side())
    }
}
