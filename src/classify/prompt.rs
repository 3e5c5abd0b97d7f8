//! Prompt text and response schema for the classifier.
//!
//! Both list every allowed value explicitly. The schema constrains the
//! model's decoder; the prompt repeats the lists so models that ignore the
//! schema still see them.

use serde_json::{json, Value};

use super::{Environment, Material, UNKNOWN};
use crate::impact::{table::furniture_keys, Condition};

/// Allowed `furnitureType` values, including the sentinel.
pub fn furniture_type_enum() -> Vec<&'static str> {
    furniture_keys().chain(std::iter::once(UNKNOWN)).collect()
}

/// Instruction sent alongside the photo.
pub fn build_prompt(location: Option<&str>) -> String {
    let keys: Vec<&str> = furniture_keys().collect();
    let materials: Vec<&str> = Material::ALL.iter().map(|m| m.as_str()).collect();
    let conditions: Vec<&str> = Condition::ALL.iter().map(|c| c.as_str()).collect();
    let environments: Vec<&str> = Environment::ALL.iter().map(|e| e.as_str()).collect();

    let mut prompt = format!(
        "Analyze this image of a piece of furniture. Identify the furniture from the provided list.\n\
         \n\
         Valid furniture identifiers: {}\n\
         Valid materials: {}\n\
         Valid conditions: {}\n\
         Valid environments: {}\n\
         \n\
         Respond ONLY with a JSON object matching the specified schema. \
         If you cannot determine the type or the material, use \"{}\".",
        keys.join(", "),
        materials.join(", "),
        conditions.join(", "),
        environments.join(", "),
        UNKNOWN,
    );

    if let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) {
        prompt.push_str(&format!("\n\nThe user's location is: {}.", location));
    }
    prompt
}

/// OpenAPI-style schema in the dialect accepted by `generationConfig.responseSchema`.
pub fn response_schema() -> Value {
    let materials: Vec<&str> = Material::ALL
        .iter()
        .map(|m| m.as_str())
        .chain(std::iter::once(UNKNOWN))
        .collect();
    let conditions: Vec<&str> = Condition::ALL.iter().map(|c| c.as_str()).collect();
    let environments: Vec<&str> = Environment::ALL.iter().map(|e| e.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "furnitureType": {
                "type": "STRING",
                "enum": furniture_type_enum(),
                "description": "The identifier of the furniture, including material and type (e.g. 'wooden chair')."
            },
            "furnitureMaterial": {
                "type": "STRING",
                "enum": materials,
                "description": "The dominant material of the furniture."
            },
            "condition": {
                "type": "STRING",
                "enum": conditions,
                "description": "Visible state of wear."
            },
            "environment": {
                "type": "STRING",
                "enum": environments,
                "description": "Whether the photo was taken indoors or outdoors."
            }
        },
        "required": ["furnitureType"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_key() {
        let prompt = build_prompt(None);
        for key in furniture_keys() {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(prompt.contains("particle board"));
        assert!(!prompt.contains("location"));
    }

    #[test]
    fn test_prompt_appends_location() {
        let prompt = build_prompt(Some(" Lyon "));
        assert!(prompt.ends_with("The user's location is: Lyon."));
        assert_eq!(build_prompt(Some("   ")), build_prompt(None));
    }

    #[test]
    fn test_schema_enumerates_keys_and_sentinel() {
        let schema = response_schema();
        let values = schema["properties"]["furnitureType"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(values.len(), furniture_keys().count() + 1);
        assert_eq!(values.last().unwrap(), UNKNOWN);
        assert_eq!(schema["required"][0], "furnitureType");
        assert_eq!(
            schema["properties"]["condition"]["enum"],
            json!(["good", "average", "poor"])
        );
    }
}
