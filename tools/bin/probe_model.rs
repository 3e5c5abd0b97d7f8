use std::path::PathBuf;

use anyhow::Result;
use image::{ImageFormat, Rgb, RgbImage};
use upcycle_impact::classify::ModelReply;
use upcycle_impact::{prepare_photo, AppConfig, GeminiClassifier};
use upcycle_scale::presets::PhotoPreset;

/// Sends one photo to the configured model and prints the raw reply.
///
/// Usage: `probe_model [PHOTO]`. Without a photo a flat brown test image is used,
/// which the model should answer with `"unknown"`.
#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    println!("Probing {} at {} ...", config.model, config.api_base);

    let classifier = match GeminiClassifier::from_config(&config) {
        Ok(classifier) => classifier,
        Err(e) => {
            println!("✗ {}", e);
            println!("Export API_KEY before running the probe.");
            return Ok(());
        }
    };

    let (bytes, name) = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => (std::fs::read(&path)?, path.display().to_string()),
        None => (dummy_png()?, "synthetic 64x64 image".to_string()),
    };
    let upload = prepare_photo(bytes, Some(name.clone()), PhotoPreset::Small, config.jpeg_quality)?;
    println!(
        "Photo: {} -> {}x{}, {} base64 bytes",
        name,
        upload.encoded.size.w,
        upload.encoded.size.h,
        upload.encoded.data.len()
    );

    match classifier.generate_raw(&upload.encoded, None).await {
        Ok(text) => {
            println!("✓ Model responded");
            println!("Raw reply: {}", text);
            match ModelReply::from_json(&text).and_then(|reply| reply.interpret()) {
                Ok(result) => println!("Interpreted: {:?}", result),
                Err(e) => println!("Interpretation: {}", e),
            }
        }
        Err(e) => {
            println!("✗ Request failed: {}", e);
        }
    }

    println!("Probe completed.");
    Ok(())
}

fn dummy_png() -> Result<Vec<u8>> {
    let img = RgbImage::from_pixel(64, 64, Rgb([139, 94, 60]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
