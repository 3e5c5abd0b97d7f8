//! Upcycling impact calculation.
//!
//! All figures derive from one [`FurnitureProfile`] and, under the
//! condition-aware policy, the item's condition:
//!
//! - CO2 saved = embodied CO2 of a new item minus a fixed 5 kg for transport
//!   and refinishing, floored at zero.
//! - Community cost avoided = weight × disposal cost per kg, floored at zero.
//! - Value created = new price minus the upcycling cost, where the upcycling
//!   cost is a fraction of the new price.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::table::{profile_or_default, FurnitureProfile};

/// CO2 spent on transport and refinishing when upcycling, in kg.
pub const UPCYCLE_CO2_KG: f64 = 5.0;

const FLAT_COST_RATIO: f64 = 0.20;
const DEFAULT_COST_RATIO: f64 = 0.30;

/// Visual condition of the item as judged from the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Good,
    Average,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Good, Condition::Average, Condition::Poor];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Good => "good",
            Condition::Average => "average",
            Condition::Poor => "poor",
        }
    }

    /// Case-insensitive parse; anything unrecognised is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "good" => Some(Condition::Good),
            "average" => Some(Condition::Average),
            "poor" => Some(Condition::Poor),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of the new price spent on upcycling, by condition.
///
/// Absent or unrecognised conditions cost the same as `average`.
pub fn cost_ratio(condition: Option<Condition>) -> f64 {
    match condition {
        Some(Condition::Good) => 0.15,
        Some(Condition::Average) => DEFAULT_COST_RATIO,
        Some(Condition::Poor) => 0.60,
        None => DEFAULT_COST_RATIO,
    }
}

/// How the upcycling cost is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostPolicy {
    /// 20% of the new price whatever the condition; value created floored at zero.
    Flat,
    /// Ratio from [`cost_ratio`]; value created may go negative, meaning the
    /// item is not worth upcycling economically.
    #[default]
    ConditionAware,
}

/// The three figures shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEstimate {
    pub co2_saved_kg: f64,
    pub community_cost_avoided: f64,
    pub value_created: f64,
}

impl ImpactEstimate {
    /// False when upcycling costs more than buying new.
    pub fn is_worth_upcycling(&self) -> bool {
        self.value_created >= 0.0
    }
}

/// Stateless calculator bound to a cost policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactCalculator {
    policy: CostPolicy,
}

impl ImpactCalculator {
    pub fn with_policy(policy: CostPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CostPolicy {
        self.policy
    }

    /// Estimate the impact for a furniture key; unknown keys use the default profile.
    pub fn compute(&self, key: &str, condition: Option<Condition>) -> ImpactEstimate {
        self.compute_for(profile_or_default(key), condition)
    }

    /// Estimate the impact for an explicit profile.
    pub fn compute_for(
        &self,
        profile: &FurnitureProfile,
        condition: Option<Condition>,
    ) -> ImpactEstimate {
        let co2_saved_kg = (profile.co2_new_kg - UPCYCLE_CO2_KG).max(0.0);
        let community_cost_avoided = (profile.weight_kg * profile.disposal_cost_per_kg).max(0.0);
        let value_created = profile.new_price - self.upcycling_cost(profile, condition);

        let value_created = match self.policy {
            CostPolicy::Flat => value_created.max(0.0),
            CostPolicy::ConditionAware => value_created,
        };

        ImpactEstimate {
            co2_saved_kg,
            community_cost_avoided,
            value_created,
        }
    }

    /// Estimated refinishing cost in euros.
    pub fn upcycling_cost(&self, profile: &FurnitureProfile, condition: Option<Condition>) -> f64 {
        let ratio = match self.policy {
            CostPolicy::Flat => FLAT_COST_RATIO,
            CostPolicy::ConditionAware => cost_ratio(condition),
        };
        profile.new_price * ratio
    }
}

/// Estimate with the default (condition-aware) policy.
pub fn compute_impact(key: &str, condition: Option<Condition>) -> ImpactEstimate {
    ImpactCalculator::default().compute(key, condition)
}
