//! # Photo Preparation
//!
//! Turns the user's file into what the classifier and the result card need:
//! a downscaled RGB preview and a base64 JPEG payload.
//!
//! Decoding and encoding are CPU-bound; [`load_photo`] runs them on Tokio's
//! blocking pool so the runtime stays responsive.

use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use fast_image_resize::Resizer;
use image::{codecs::jpeg::JpegEncoder, RgbImage};
use upcycle_scale::cpu::scale_rgb_cpu;
use upcycle_scale::presets::{build_plan, AspectMode, PhotoPreset, ScalePlan, Size};

use crate::error::{UpcycleError, UpcycleResult};

pub const JPEG_MIME: &str = "image/jpeg";

/// Base64 image payload ready to embed in a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub data: String,
    pub size: Size,
}

impl EncodedImage {
    /// Wrap already-encoded JPEG bytes.
    pub fn from_jpeg_bytes(bytes: &[u8], size: Size) -> Self {
        Self {
            mime_type: JPEG_MIME,
            data: general_purpose::STANDARD.encode(bytes),
            size,
        }
    }

    /// `data:` URL form of the payload.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// A photo accepted for analysis: the raw file plus its derived forms.
///
/// Cloning is cheap; all buffers are shared.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub raw: Arc<[u8]>,
    pub preview: Arc<RgbImage>,
    pub encoded: Arc<EncodedImage>,
}

/// Decode, downscale and re-encode a photo held in memory.
pub fn prepare_photo(
    bytes: Vec<u8>,
    file_name: Option<String>,
    preset: PhotoPreset,
    jpeg_quality: u8,
) -> UpcycleResult<Upload> {
    let format = image::guess_format(&bytes)
        .map_err(|_| UpcycleError::image("decode", "not a recognised image format"))?;
    // Bytes are already in memory: a read error here means a truncated file.
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| UpcycleError::image("decode", e.to_string()))?;
    let rgb = decoded.to_rgb8();

    let input = Size {
        w: rgb.width(),
        h: rgb.height(),
    };
    let plan = build_plan(input, preset.to_target(), AspectMode::Preserve);
    let preview = if plan.is_identity() {
        rgb
    } else {
        resize_rgb(&rgb, &plan)?
    };

    let jpeg = encode_jpeg(&preview, jpeg_quality)?;
    let size = Size {
        w: preview.width(),
        h: preview.height(),
    };
    tracing::debug!(
        ?format,
        original = %format!("{}x{}", input.w, input.h),
        scaled = %format!("{}x{}", size.w, size.h),
        jpeg_bytes = jpeg.len(),
        "photo prepared"
    );

    Ok(Upload {
        file_name,
        raw: Arc::from(bytes),
        encoded: Arc::new(EncodedImage::from_jpeg_bytes(&jpeg, size)),
        preview: Arc::new(preview),
    })
}

/// Read a photo from disk and prepare it off the async runtime.
pub async fn load_photo(
    path: &Path,
    preset: PhotoPreset,
    jpeg_quality: u8,
) -> UpcycleResult<Upload> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        UpcycleError::io("read_photo", e).with_path(path.display().to_string())
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    tokio::task::spawn_blocking(move || prepare_photo(bytes, file_name, preset, jpeg_quality))
        .await
        .map_err(|e| UpcycleError::image("prepare", format!("worker failed: {}", e)))?
}

/// Execute a scaling plan on an RGB image.
pub(crate) fn resize_rgb(image: &RgbImage, plan: &ScalePlan) -> UpcycleResult<RgbImage> {
    let input = Size {
        w: image.width(),
        h: image.height(),
    };
    let mut out = vec![0u8; plan.out_len()];
    let mut resizer = Resizer::new();
    scale_rgb_cpu(&mut resizer, image.as_raw(), input, plan, &mut out)?;
    RgbImage::from_raw(plan.out.w, plan.out.h, out)
        .ok_or_else(|| UpcycleError::image("scale", "output buffer does not match plan"))
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> UpcycleResult<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode_image(image)?;
    Ok(out)
}
