//! # Presentation
//!
//! Everything a user sees: text screens for each [`AppState`], localized
//! display names, the exported result card ([`card`]) and the share seam
//! ([`share`]).

pub mod card;
pub mod share;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::UpcycleError;
use crate::session::{AnalysisResult, AppState};

pub use card::{export_card, render_card, CardExport, CardLayout, CatalogueMaxima};
pub use share::{share_card, ShareOutcome, ShareRequest, ShareSheet, TerminalShare};

/// Display language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Language {
    #[default]
    En,
    Fr,
}

static FRENCH_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("wooden chair", "chaise en bois"),
        ("wooden table", "table en bois"),
        ("wooden cabinet", "meuble de rangement en bois"),
        ("wooden bookshelf", "bibliothèque en bois"),
        ("metal chair", "chaise en métal"),
        ("metal cabinet", "meuble de rangement en métal"),
        ("plastic chair", "chaise en plastique"),
        ("particle board table", "table en panneau de particules"),
        ("fabric sofa", "canapé en tissu"),
        ("wood", "bois"),
        ("metal", "métal"),
        ("particle board", "panneau de particules"),
        ("plastic", "plastique"),
        ("fabric", "tissu"),
    ])
});

/// Display name of a furniture key or material. Unlisted terms pass through.
pub fn display_name(term: &str, language: Language) -> String {
    match language {
        Language::En => term.to_string(),
        Language::Fr => FRENCH_NAMES
            .get(term.trim().to_lowercase().as_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| term.to_string()),
    }
}

/// Fixed UI strings for one language.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub co2_saved: &'static str,
    pub cost_avoided: &'static str,
    pub value_created: &'static str,
    pub landing: &'static str,
    pub loading: &'static [&'static str],
    pub start_over: &'static str,
    pub analyze_another: &'static str,
    pub attribution: &'static str,
    pub card_saved: &'static str,
}

const ENGLISH: Labels = Labels {
    co2_saved: "CO2 saved",
    cost_avoided: "Cost avoided",
    value_created: "Value created",
    landing: "Upload a photo of a piece of furniture to see its upcycling impact.",
    loading: &[
        "Analyzing your furniture...",
        "Calculating CO2 savings...",
        "Estimating the value for the community...",
        "Preparing your impact report...",
    ],
    start_over: "Start over",
    analyze_another: "Analyze another piece of furniture",
    attribution: "Generated by The Upcycle Impact Visualizer",
    card_saved: "Card saved to",
};

const FRENCH: Labels = Labels {
    co2_saved: "CO2 Économisé",
    cost_avoided: "Coût Évité",
    value_created: "Valeur Créée",
    landing: "Téléchargez la photo d'un meuble pour découvrir son impact.",
    loading: &[
        "Analyse de votre meuble...",
        "Calcul des économies de CO2...",
        "Estimation de la valeur pour la communauté...",
        "Préparation de votre rapport d'impact...",
    ],
    start_over: "Recommencer",
    analyze_another: "Analyser un autre meuble",
    attribution: "Généré par The Upcycle Impact Visualizer",
    card_saved: "Carte enregistrée dans",
};

impl Language {
    pub fn labels(self) -> &'static Labels {
        match self {
            Language::En => &ENGLISH,
            Language::Fr => &FRENCH,
        }
    }
}

/// CO2 in whole kilograms: `"20 kg"`.
pub fn format_kg(value: f64) -> String {
    format!("{} kg", value.round())
}

/// Currency in whole euros: `"72 €"`.
pub fn format_eur(value: f64) -> String {
    format!("{} €", value.round())
}

/// Headline of the result card.
pub fn headline(result: &AnalysisResult, language: Language) -> String {
    let name = display_name(result.furniture_key(), language);
    let place = result.location.as_deref();
    match (language, place) {
        (Language::En, None) => format!("Your {} has incredible potential!", name),
        (Language::En, Some(place)) => format!("Your {} has incredible potential in {}!", name, place),
        (Language::Fr, None) => format!("Votre {} a un potentiel incroyable !", name),
        (Language::Fr, Some(place)) => {
            format!("Votre {} a un potentiel incroyable à {} !", name, place)
        }
    }
}

/// Multi-line results card.
pub fn render_results(result: &AnalysisResult, language: Language) -> String {
    let labels = language.labels();
    let impact = &result.impact;
    let mut lines = vec![headline(result, language), String::new()];
    lines.push(format!("  {:<14} {}", labels.co2_saved, format_kg(impact.co2_saved_kg)));
    lines.push(format!(
        "  {:<14} {}",
        labels.cost_avoided,
        format_eur(impact.community_cost_avoided)
    ));
    lines.push(format!(
        "  {:<14} {}",
        labels.value_created,
        format_eur(impact.value_created)
    ));

    let classification = &result.classification;
    let mut details = Vec::new();
    if let Some(material) = classification.material {
        details.push(display_name(material.as_str(), language));
    }
    if let Some(condition) = classification.condition {
        details.push(condition.to_string());
    }
    if let Some(environment) = classification.environment {
        details.push(environment.as_str().to_string());
    }
    if !details.is_empty() {
        lines.push(String::new());
        lines.push(format!("  ({})", details.join(", ")));
    }

    lines.push(String::new());
    lines.push(labels.attribution.to_string());
    lines.join("\n")
}

/// Error screen with the retry hint.
pub fn render_error(message: &str, language: Language) -> String {
    format!("{}\n\n[{}]", message, language.labels().start_over)
}

/// Startup screen shown when the application cannot be used at all.
pub fn render_config_error(error: &UpcycleError) -> String {
    let mut out = format!("Configuration error\n\n{}", error.user_message());
    if let UpcycleError::Configuration { field, .. } = error {
        out.push_str(&format!(
            "\n\nExport {} in the environment before starting the application.",
            field
        ));
    }
    out
}

/// Text rendering of any controller state.
pub fn render_state(state: &AppState, language: Language) -> String {
    let labels = language.labels();
    match state {
        AppState::Landing => labels.landing.to_string(),
        AppState::Loading { .. } => labels.loading[0].to_string(),
        AppState::Results { result, .. } => render_results(result, language),
        AppState::Error { message, .. } => render_error(message, language),
    }
}
