//! # Impact Engine
//!
//! Static furniture data and the pure calculation that turns a furniture key
//! (plus an optional condition) into the three upcycling figures.

pub mod calculator;
pub mod table;

pub use calculator::{
    compute_impact, cost_ratio, Condition, CostPolicy, ImpactCalculator, ImpactEstimate,
    UPCYCLE_CO2_KG,
};
pub use table::{
    default_profile, furniture_keys, lookup, profile_or_default, FurnitureProfile,
    DEFAULT_FURNITURE_KEY, PROFILES,
};
