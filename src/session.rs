//! # Analysis Session
//!
//! The application's flow is a four-state machine:
//!
//! ```text
//!            begin(upload)            complete(Ok)
//! Landing ─────────────────▶ Loading ─────────────▶ Results
//!    ▲                          │                      │
//!    │                          │ complete(Err)        │
//!    │                          ▼                      │
//!    └──────── reset ──────── Error ◀──────────────────┘ (reset from any state)
//! ```
//!
//! [`AnalysisController`] is the synchronous state machine: every transition
//! is a method, every state carries its own payload, and a completion is
//! applied only if its [`AnalysisTicket`] is still current. That makes replies
//! arriving after a reset harmless.
//!
//! [`AnalysisSession`] drives the controller on Tokio: it owns the single
//! in-flight classification task and aborts it on reset or when dropped.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::classify::{ClassificationResult, Classifier};
use crate::error::{UpcycleError, UpcycleResult};
use crate::impact::{ImpactCalculator, ImpactEstimate};
use crate::photo::Upload;

/// Identifies one analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisTicket(u64);

/// Outcome of an analysis, held for the current session only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub classification: ClassificationResult,
    pub impact: ImpactEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl AnalysisResult {
    pub fn furniture_key(&self) -> &str {
        &self.classification.furniture_key
    }
}

/// Current screen of the application.
#[derive(Debug, Clone)]
pub enum AppState {
    Landing,
    Loading {
        upload: Upload,
        ticket: AnalysisTicket,
        started_at: DateTime<Utc>,
    },
    Results {
        upload: Upload,
        result: AnalysisResult,
    },
    Error {
        message: String,
        category: &'static str,
    },
}

impl AppState {
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Landing => "landing",
            AppState::Loading { .. } => "loading",
            AppState::Results { .. } => "results",
            AppState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AppState::Loading { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AppState::Results { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AppState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a completion changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was superseded (reset or newer upload); nothing changed.
    Stale,
}

/// Synchronous state machine behind the analysis flow.
#[derive(Debug)]
pub struct AnalysisController {
    state: AppState,
    location: Option<String>,
    calculator: ImpactCalculator,
    next_ticket: u64,
}

impl AnalysisController {
    pub fn new(calculator: ImpactCalculator) -> Self {
        Self {
            state: AppState::Landing,
            location: None,
            calculator,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Set or clear the location hint used by the next analysis.
    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
    }

    /// `Landing → Loading`. Rejected in any other state, leaving it untouched.
    pub fn begin(&mut self, upload: Upload) -> UpcycleResult<AnalysisTicket> {
        if !matches!(self.state, AppState::Landing) {
            return Err(UpcycleError::state(
                self.state.name(),
                "begin",
                "an analysis can only start from the landing screen",
            ));
        }
        self.next_ticket += 1;
        let ticket = AnalysisTicket(self.next_ticket);
        tracing::debug!(ticket = ticket.0, file = ?upload.file_name, "analysis started");
        self.state = AppState::Loading {
            upload,
            ticket,
            started_at: Utc::now(),
        };
        Ok(ticket)
    }

    /// `Loading → Results | Error`, if `ticket` is still the current request.
    pub fn complete(
        &mut self,
        ticket: AnalysisTicket,
        outcome: UpcycleResult<ClassificationResult>,
    ) -> Completion {
        let (upload, started_at) = match std::mem::replace(&mut self.state, AppState::Landing) {
            AppState::Loading {
                upload,
                ticket: current,
                started_at,
            } if current == ticket => (upload, started_at),
            other => {
                tracing::debug!(ticket = ticket.0, state = other.name(), "discarding stale completion");
                self.state = other;
                return Completion::Stale;
            }
        };

        self.state = match outcome {
            Ok(classification) => {
                let impact = self
                    .calculator
                    .compute(&classification.furniture_key, classification.condition);
                tracing::info!(
                    furniture = %classification.furniture_key,
                    co2_saved_kg = impact.co2_saved_kg,
                    value_created = impact.value_created,
                    "analysis complete"
                );
                AppState::Results {
                    upload,
                    result: AnalysisResult {
                        classification,
                        impact,
                        location: self.location.clone(),
                        uploaded_at: Some(started_at),
                    },
                }
            }
            Err(error) => {
                tracing::warn!(category = error.category(), %error, "analysis failed");
                AppState::Error {
                    message: error.user_message(),
                    category: error.category(),
                }
            }
        };
        Completion::Applied
    }

    /// Back to `Landing`, clearing upload, result, error and location.
    pub fn reset(&mut self) {
        if self.state.is_loading() {
            tracing::debug!("reset while loading; in-flight reply will be ignored");
        }
        self.state = AppState::Landing;
        self.location = None;
    }
}

impl Default for AnalysisController {
    fn default() -> Self {
        Self::new(ImpactCalculator::default())
    }
}

/// Async driver owning the one in-flight classification.
pub struct AnalysisSession {
    controller: AnalysisController,
    classifier: Arc<dyn Classifier>,
    in_flight: Option<(AnalysisTicket, JoinHandle<UpcycleResult<ClassificationResult>>)>,
}

impl AnalysisSession {
    pub fn new(classifier: Arc<dyn Classifier>, calculator: ImpactCalculator) -> Self {
        Self {
            controller: AnalysisController::new(calculator),
            classifier,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &AppState {
        self.controller.state()
    }

    pub fn controller(&self) -> &AnalysisController {
        &self.controller
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.controller.set_location(location);
    }

    /// Enter `Loading` and start the classification in the background.
    pub fn upload(&mut self, upload: Upload) -> UpcycleResult<AnalysisTicket> {
        let encoded = Arc::clone(&upload.encoded);
        let ticket = self.controller.begin(upload)?;
        let classifier = Arc::clone(&self.classifier);
        let location = self.controller.location().map(str::to_owned);

        let handle = tokio::spawn(async move {
            classifier.classify(&encoded, location.as_deref()).await
        });
        self.in_flight = Some((ticket, handle));
        Ok(ticket)
    }

    /// Wait for the in-flight classification (if any) and apply it.
    pub async fn wait(&mut self) -> &AppState {
        if let Some((ticket, handle)) = self.in_flight.take() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) if join_error.is_cancelled() => return self.controller.state(),
                Err(join_error) => Err(UpcycleError::transport(
                    "classify",
                    format!("classification task failed: {}", join_error),
                )),
            };
            self.controller.complete(ticket, outcome);
        }
        self.controller.state()
    }

    /// Upload and wait in one step.
    pub async fn analyze(&mut self, upload: Upload) -> UpcycleResult<&AppState> {
        self.upload(upload)?;
        Ok(self.wait().await)
    }

    /// Abort any in-flight call and return to `Landing`.
    pub fn reset(&mut self) {
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
        }
        self.controller.reset();
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        if let Some((ticket, handle)) = self.in_flight.take() {
            tracing::debug!(ticket = ticket.0, "session dropped; aborting classification");
            handle.abort();
        }
    }
}
