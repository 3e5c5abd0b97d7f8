use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use upcycle_impact::present::{
    self, card, share_card, CardLayout, Language, ShareOutcome, ShareRequest, TerminalShare,
};
use upcycle_impact::{
    load_photo, AnalysisSession, AppConfig, AppState, CostPolicy, GeminiClassifier,
    LocationResolver, LocationSource, UpcycleError,
};
use upcycle_scale::presets::PhotoPreset;

/// Estimate the upcycling impact of a piece of furniture from a photo.
#[derive(Parser, Debug)]
#[command(name = "upcycle")]
#[command(about = "♻️  See the CO2, cost and value an upcycled piece of furniture is worth")]
#[command(long_about = "Send a furniture photo to a multimodal model, identify the piece and its \
condition, and estimate the CO2 saved, the disposal cost avoided and the value created by \
upcycling it. Requires API_KEY in the environment.")]
struct Args {
    /// Photo of the furniture
    #[arg(help = "Photo file (JPEG, PNG, WebP, ...)")]
    photo: PathBuf,

    /// Location typed by the user
    #[arg(long, conflicts_with = "locate", help = "Where the furniture is, e.g. \"Lyon\"")]
    location: Option<String>,

    /// Look the location up automatically
    #[arg(long, help = "Look up your approximate position over the network")]
    locate: bool,

    /// How the upcycling cost is estimated
    #[arg(long, value_enum, default_value_t = PolicyArg::Condition,
          help = "flat (20% of the new price) or condition (depends on wear)")]
    cost_policy: PolicyArg,

    /// Photo size sent to the model
    #[arg(long, value_enum, default_value_t = PhotoPreset::Large,
          help = "small (512px), medium (768px) or large (1024px) longest side")]
    preset: PhotoPreset,

    /// Where to write the result card
    #[arg(long, default_value = card::DEFAULT_CARD_FILE,
          help = "PNG output path; a .json sidecar is written next to it")]
    card: PathBuf,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Offer to share the card after exporting it
    #[arg(long)]
    share: bool,

    /// Display language
    #[arg(long, value_enum, default_value_t = Language::En, help = "en or fr")]
    lang: Language,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Flat,
    Condition,
}

impl From<PolicyArg> for CostPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Flat => CostPolicy::Flat,
            PolicyArg::Condition => CostPolicy::ConditionAware,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = AppConfig::from_env()
        .with_cost_policy(args.cost_policy.into())
        .with_photo_preset(args.preset);

    let classifier = match GeminiClassifier::from_config(&config) {
        Ok(classifier) => classifier,
        Err(error @ UpcycleError::Configuration { .. }) => {
            eprintln!("{}", present::render_config_error(&error));
            return Ok(ExitCode::from(2));
        }
        Err(error) => return Err(error).context("invalid configuration"),
    };

    let source = if args.locate {
        LocationSource::Automatic
    } else {
        args.location
            .clone()
            .map(LocationSource::Manual)
            .unwrap_or_default()
    };
    let resolver = LocationResolver::new(config.geolocation_endpoint.clone());

    let (location, upload) = tokio::join!(
        resolver.resolve(&source),
        load_photo(&args.photo, config.photo_preset, config.jpeg_quality)
    );

    let location = match location {
        Ok(location) => location,
        Err(error) => {
            eprintln!("{}", error.user_message());
            None
        }
    };
    let upload = match upload {
        Ok(upload) => upload,
        Err(error) => {
            tracing::debug!(%error, "photo rejected");
            println!("{}", present::render_error(&error.user_message(), args.lang));
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut session = AnalysisSession::new(Arc::new(classifier), config.calculator());
    session.set_location(location);
    session.upload(upload)?;
    if !args.json {
        println!("{}", present::render_state(session.state(), args.lang));
    }

    let state = session.wait().await.clone();
    let AppState::Results { upload, result } = &state else {
        println!("{}", present::render_state(&state, args.lang));
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("\n{}", present::render_results(result, args.lang));
    }

    let export = {
        let result = result.clone();
        let photo = Arc::clone(&upload.preview);
        let calculator = config.calculator();
        let layout = CardLayout::new(config.card_pixel_ratio);
        let path = args.card.clone();
        tokio::task::spawn_blocking(move || {
            card::export_card(&result, &photo, &calculator, layout, &path)
        })
        .await??
    };
    if !args.json {
        println!(
            "\n{} {}",
            args.lang.labels().card_saved,
            export.png_path.display()
        );
    }

    if args.share {
        let request = ShareRequest::for_card(&export.png_path, args.lang);
        match share_card(&TerminalShare, &request)? {
            ShareOutcome::KeptLocally { message, .. } => eprintln!("{}", message),
            ShareOutcome::Shared | ShareOutcome::Cancelled => {}
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "upcycle_impact=debug,upcycle=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
