// SPDX-License-Identifier: MIT
// RGB8 photo scaler on top of fast_image_resize.
// RGB8 in → RGB8 out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImageMut, TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{ResizeOptions, Resizer};

use crate::presets::{AspectMode, ScalePlan, Size};

#[derive(Debug)]
pub enum ScaleError {
    BufferTooSmall { needed: usize, got: usize },
    SourceSizeMismatch { expected: usize, got: usize },
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Crop(fir::CropBoxError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }
impl From<fir::CropBoxError> for ScaleError { fn from(e: fir::CropBoxError) -> Self { Self::Crop(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferTooSmall { needed, got } => {
                write!(f, "Output buffer too small ({} bytes needed, {} given)", needed, got)
            }
            ScaleError::SourceSizeMismatch { expected, got } => {
                write!(f, "Source buffer holds {} bytes, expected {}", got, expected)
            }
            ScaleError::Fir(e) => write!(f, "resize failed: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "invalid pixel buffer: {}", e),
            ScaleError::Crop(e) => write!(f, "invalid letterbox region: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            ScaleError::Crop(e) => Some(e),
            _ => None,
        }
    }
}

/// Render `src_rgb` into `dst` following `plan`.
/// `src_rgb` must be tightly packed (`src.w * 3` bytes per row).
/// `dst` must hold at least `plan.out_len()` bytes; with `AspectMode::Pad` the
/// area outside the content rectangle is filled with the background colour.
pub fn scale_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    src: Size,
    plan: &ScalePlan,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    let src_len = (src.w as usize) * (src.h as usize) * 3;
    if src_rgb.len() != src_len {
        return Err(ScaleError::SourceSizeMismatch {
            expected: src_len,
            got: src_rgb.len(),
        });
    }
    let dst_len = plan.out_len();
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall {
            needed: dst_len,
            got: dst.len(),
        });
    }
    let dst = &mut dst[..dst_len];

    let src_view = TypedImageRef::<U8x3>::from_buffer(src.w, src.h, src_rgb)?;
    let opts = ResizeOptions::new();

    match plan.dst_roi {
        None => {
            let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, dst)?;
            resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;
        }
        Some((x, y, w, h)) => {
            // Letterbox background must be written before the typed view borrows dst.
            if let AspectMode::Pad { bg_rgb } = plan.aspect {
                fill_rgb(dst, bg_rgb);
            }
            let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, dst)?;
            let mut roi = TypedCroppedImageMut::from_ref(&mut dst_image, x, y, w, h)?;
            resizer.resize_typed::<U8x3>(&src_view, &mut roi, &opts)?;
        }
    }

    Ok(())
}

#[inline]
fn fill_rgb(dst: &mut [u8], bg: [u8; 3]) {
    for px in dst.chunks_exact_mut(3) {
        px.copy_from_slice(&bg);
    }
}
