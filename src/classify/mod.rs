//! # Image Classification
//!
//! Adapter between a furniture photo and an external multimodal model.
//!
//! ## Architecture
//!
//! 1. **Prompt + schema** ([`prompt`]): enumerate the valid answers per field
//! 2. **Classifier trait**: one async call per analysis, no retries
//! 3. **Gemini client** ([`gemini`]): `generateContent` over HTTPS
//! 4. **Reply interpretation** ([`ModelReply::interpret`]): sentinel and
//!    enum handling shared by every backend

pub mod gemini;
pub mod prompt;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{UpcycleError, UpcycleResult};
use crate::impact::Condition;
use crate::photo::EncodedImage;

pub use gemini::GeminiClassifier;

/// Value the model uses when it cannot answer.
pub const UNKNOWN: &str = "unknown";

/// Dominant material of the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    #[serde(rename = "wood")]
    Wood,
    #[serde(rename = "metal")]
    Metal,
    #[serde(rename = "particle board")]
    ParticleBoard,
    #[serde(rename = "plastic")]
    Plastic,
    #[serde(rename = "fabric")]
    Fabric,
}

impl Material {
    pub const ALL: [Material; 5] = [
        Material::Wood,
        Material::Metal,
        Material::ParticleBoard,
        Material::Plastic,
        Material::Fabric,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Material::Wood => "wood",
            Material::Metal => "metal",
            Material::ParticleBoard => "particle board",
            Material::Plastic => "plastic",
            Material::Fabric => "fabric",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the item is photographed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Indoor,
    Outdoor,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Indoor, Environment::Outdoor];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Indoor => "indoor",
            Environment::Outdoor => "outdoor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "indoor" => Some(Environment::Indoor),
            "outdoor" => Some(Environment::Outdoor),
            _ => None,
        }
    }
}

/// What the classifier saw. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub furniture_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
}

impl ClassificationResult {
    pub fn new(furniture_key: impl Into<String>) -> Self {
        Self {
            furniture_key: furniture_key.into(),
            material: None,
            condition: None,
            environment: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// Raw JSON object the model is asked to produce.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelReply {
    pub furniture_type: String,
    pub furniture_material: Option<String>,
    pub condition: Option<String>,
    pub environment: Option<String>,
}

impl ModelReply {
    /// Parse the model's JSON text.
    pub fn from_json(text: &str) -> UpcycleResult<Self> {
        let reply: ModelReply = serde_json::from_str(text.trim())?;
        if reply.furniture_type.trim().is_empty() {
            return Err(UpcycleError::transport(
                "decode_reply",
                "reply has no furnitureType",
            ));
        }
        Ok(reply)
    }

    /// Apply the `"unknown"` sentinel and map optional fields onto enums.
    ///
    /// Optional fields the model fills with values outside the schema are
    /// dropped rather than failing the whole analysis.
    pub fn interpret(self) -> UpcycleResult<ClassificationResult> {
        let furniture_key = self.furniture_type.trim().to_lowercase();
        if furniture_key == UNKNOWN {
            return Err(UpcycleError::classification_unknown("furnitureType"));
        }

        let material = match self.furniture_material.as_deref().map(str::trim) {
            Some(m) if m.eq_ignore_ascii_case(UNKNOWN) => {
                return Err(UpcycleError::classification_unknown("furnitureMaterial"));
            }
            Some(m) => parse_optional("furnitureMaterial", m, Material::parse),
            None => None,
        };
        let condition = self
            .condition
            .as_deref()
            .and_then(|c| parse_optional("condition", c, Condition::parse));
        let environment = self
            .environment
            .as_deref()
            .and_then(|e| parse_optional("environment", e, Environment::parse));

        Ok(ClassificationResult {
            furniture_key,
            material,
            condition,
            environment,
        })
    }
}

fn parse_optional<T>(field: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() && !value.trim().is_empty() {
        tracing::warn!(field, value, "ignoring value outside the response schema");
    }
    parsed
}

/// A backend able to identify furniture in a photo.
///
/// Implementations make exactly one external call per invocation.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the photo, optionally hinting the user's location.
    async fn classify(
        &self,
        image: &EncodedImage,
        location: Option<&str>,
    ) -> UpcycleResult<ClassificationResult>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
