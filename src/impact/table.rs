//! Furniture reference data.
//!
//! Figures are catalogue averages: embodied CO2 of a new item, typical
//! weight, municipal disposal cost per kilogram and retail price in euros.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

/// Key used when a lookup misses.
pub const DEFAULT_FURNITURE_KEY: &str = "wooden chair";

/// Physical and economic constants for one kind of furniture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureProfile {
    pub key: &'static str,
    /// Embodied CO2 of a new equivalent, in kg.
    pub co2_new_kg: f64,
    pub weight_kg: f64,
    pub disposal_cost_per_kg: f64,
    /// Retail price of a new equivalent, in euros.
    pub new_price: f64,
}

const fn profile(
    key: &'static str,
    co2_new_kg: f64,
    weight_kg: f64,
    disposal_cost_per_kg: f64,
    new_price: f64,
) -> FurnitureProfile {
    FurnitureProfile {
        key,
        co2_new_kg,
        weight_kg,
        disposal_cost_per_kg,
        new_price,
    }
}

/// Catalogue in display order. Keys are lower-case canonical identifiers.
pub static PROFILES: [FurnitureProfile; 9] = [
    profile("wooden chair", 25.0, 5.0, 1.0, 90.0),
    profile("wooden table", 80.0, 30.0, 1.0, 215.0),
    profile("wooden cabinet", 150.0, 60.0, 1.0, 315.0),
    profile("wooden bookshelf", 120.0, 45.0, 1.0, 190.0),
    profile("metal chair", 40.0, 8.0, 0.8, 115.0),
    profile("metal cabinet", 200.0, 70.0, 0.8, 365.0),
    profile("plastic chair", 15.0, 3.0, 1.2, 55.0),
    profile("particle board table", 60.0, 25.0, 1.5, 150.0),
    profile("fabric sofa", 250.0, 80.0, 1.2, 600.0),
];

static TABLE: LazyLock<HashMap<&'static str, &'static FurnitureProfile>> =
    LazyLock::new(|| PROFILES.iter().map(|p| (p.key, p)).collect());

/// Canonical form of a furniture key: trimmed, lower case.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Exact lookup after normalisation.
pub fn lookup(key: &str) -> Option<&'static FurnitureProfile> {
    TABLE.get(normalize_key(key).as_str()).copied()
}

/// Lookup that substitutes the default profile on a miss.
pub fn profile_or_default(key: &str) -> &'static FurnitureProfile {
    match lookup(key) {
        Some(profile) => profile,
        None => {
            // Silent substitution can hide classification drift; keep a trace of it.
            tracing::debug!(key, fallback = DEFAULT_FURNITURE_KEY, "furniture key not in table");
            default_profile()
        }
    }
}

/// The fallback profile.
pub fn default_profile() -> &'static FurnitureProfile {
    &PROFILES[0]
}

/// Every valid key, in catalogue order.
pub fn furniture_keys() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|p| p.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_and_canonical() {
        assert_eq!(TABLE.len(), PROFILES.len());
        for key in furniture_keys() {
            assert_eq!(key, normalize_key(key));
        }
    }

    #[test]
    fn test_lookup_normalizes() {
        let profile = lookup("  Fabric SOFA ").unwrap();
        assert_eq!(profile.key, "fabric sofa");
        assert_eq!(profile.new_price, 600.0);
    }

    #[test]
    fn test_miss_falls_back_to_wooden_chair() {
        assert!(lookup("grand piano").is_none());
        assert_eq!(profile_or_default("grand piano").key, DEFAULT_FURNITURE_KEY);
        assert_eq!(default_profile().key, DEFAULT_FURNITURE_KEY);
    }
}
