//! Sharing the exported card.
//!
//! Platforms with a native share sheet implement [`ShareSheet`]. A terminal
//! has none, so [`TerminalShare`] always reports `ShareUnsupported` and the
//! card written to disk is what the user keeps.

use std::path::PathBuf;

use super::Language;
use crate::error::{UpcycleError, UpcycleResult};

/// What to hand to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub file: PathBuf,
    pub title: String,
    pub text: String,
}

impl ShareRequest {
    pub fn for_card(file: impl Into<PathBuf>, language: Language) -> Self {
        let (title, text) = match language {
            Language::En => (
                "My Upcycle Impact",
                "Discover the hidden value of my furniture with The Upcycle Impact Visualizer! #Upcycle #DIY #EcoFriendly",
            ),
            Language::Fr => (
                "Mon Impact Upcycle",
                "Découvrez la valeur cachée de mes meubles grâce à The Upcycle Impact Visualizer ! #Upcycle #DIY #EcoFriendly",
            ),
        };
        Self {
            file: file.into(),
            title: title.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user dismissed the share sheet. Not an error.
    Cancelled,
    /// No share sheet here; the card stays at `file`.
    KeptLocally { file: PathBuf, message: String },
}

pub trait ShareSheet {
    fn share(&self, request: &ShareRequest) -> UpcycleResult<ShareOutcome>;
}

/// Share sheet of a plain terminal session.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalShare;

impl ShareSheet for TerminalShare {
    fn share(&self, _request: &ShareRequest) -> UpcycleResult<ShareOutcome> {
        Err(UpcycleError::share_unsupported("terminal"))
    }
}

/// Share through `sheet`, falling back to the local file when unsupported.
pub fn share_card(sheet: &dyn ShareSheet, request: &ShareRequest) -> UpcycleResult<ShareOutcome> {
    match sheet.share(request) {
        Err(error @ UpcycleError::ShareUnsupported { .. }) => {
            tracing::info!(file = %request.file.display(), %error, "share unavailable, keeping card");
            Ok(ShareOutcome::KeptLocally {
                file: request.file.clone(),
                message: error.user_message(),
            })
        }
        other => other,
    }
}
