//! # Upcycle Impact Library
//!
//! Estimates the environmental and economic value of upcycling a piece of
//! furniture from a single photo.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `impact`: Furniture catalogue and the three-figure impact estimate
//! - `classify`: Prompt, response schema and the multimodal model client
//! - `photo`: Decoding, downscaling and JPEG/base64 encoding of uploads
//! - `location`: Optional manual or looked-up location hint
//! - `session`: Landing → Loading → Results | Error state machine
//! - `present`: Text screens, localized names, PNG card export and sharing
//! - `config`: Environment configuration and validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use upcycle_impact::{analyze_photo, AppConfig, GeminiClassifier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env();
//! let classifier = Arc::new(GeminiClassifier::from_config(&config)?);
//!
//! let session = analyze_photo(classifier, &config, Path::new("chair.jpg"), None).await?;
//! if let Some(result) = session.state().result() {
//!     println!("{} kg CO2 saved", result.impact.co2_saved_kg);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

pub mod classify;
pub mod config;
pub mod error;
pub mod impact;
pub mod location;
pub mod photo;
pub mod present;
pub mod session;

pub use classify::{ClassificationResult, Classifier, GeminiClassifier};
pub use config::AppConfig;
pub use error::{
    HasRecoverySuggestion, HasSeverity, Recoverable, UpcycleError, UpcycleResult,
};
pub use impact::{compute_impact, Condition, CostPolicy, ImpactCalculator, ImpactEstimate};
pub use location::{LocationResolver, LocationSource};
pub use photo::{load_photo, prepare_photo, EncodedImage, Upload};
pub use session::{AnalysisController, AnalysisResult, AnalysisSession, AppState};

/// Load a photo, classify it and compute its impact in one call.
///
/// The returned session is in `Results` or `Error`; photo and request
/// failures that happen before the analysis starts are returned as `Err`.
pub async fn analyze_photo(
    classifier: Arc<dyn Classifier>,
    config: &AppConfig,
    photo: &Path,
    location: Option<String>,
) -> UpcycleResult<AnalysisSession> {
    let upload = load_photo(photo, config.photo_preset, config.jpeg_quality).await?;
    let mut session = AnalysisSession::new(classifier, config.calculator());
    session.set_location(location);
    session.analyze(upload).await?;
    Ok(session)
}
