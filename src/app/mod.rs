use crate::model::{
    DraftRecord, FieldErrors, FieldName, FieldValue, NormalizedRecord, SubmissionOutcome,
};
use crate::services::submitter::{HttpReply, TransportError};
use crate::ui::ToastLevel;
use crate::validation::validate;
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Form submitted successfully!";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error occurred. Please check your connection and try again.";
pub const MISSING_ENDPOINT_MESSAGE: &str =
    "Missing onboarding endpoint. Set ONBOARD_URL or `endpoint` in onboard.yaml.";

/// Observable lifecycle of the form. Validation happens inside a single `Submit`
/// message, so it never shows up here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Invalid,
    Submitting,
    Succeeded,
    Failed,
}

impl FormPhase {
    pub fn label(self) -> &'static str {
        match self {
            FormPhase::Idle => "idle",
            FormPhase::Invalid => "invalid",
            FormPhase::Submitting => "submitting",
            FormPhase::Succeeded => "succeeded",
            FormPhase::Failed => "failed",
        }
    }

    pub fn accepts_edits(self) -> bool {
        matches!(self, FormPhase::Idle | FormPhase::Invalid | FormPhase::Failed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: FormPhase,
    pub to: FormPhase,
}

pub type Observer = Box<dyn FnMut(&Transition, &FormController)>;

/// Owns one form instance: the draft, its errors and the outcome of the last attempt.
#[derive(Default)]
pub struct FormController {
    draft: DraftRecord,
    errors: FieldErrors,
    outcome: SubmissionOutcome,
    phase: FormPhase,
    endpoint: Option<String>,
    in_flight: Option<NormalizedRecord>,
    observers: Vec<Observer>,
}

impl FormController {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            ..Default::default()
        }
    }

    pub fn draft(&self) -> &DraftRecord {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Whether a `Submit` would be acted on right now.
    pub fn can_submit(&self) -> bool {
        self.phase.accepts_edits() && !self.draft.is_untouched()
    }

    /// Registers a callback run after every phase change.
    pub fn subscribe(&mut self, observer: impl FnMut(&Transition, &FormController) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn enter(&mut self, to: FormPhase) {
        let t = Transition {
            from: self.phase,
            to,
        };
        self.phase = to;
        info!(from = t.from.label(), to = t.to.label(), "form transition");
        let mut observers = std::mem::take(&mut self.observers);
        for obs in observers.iter_mut() {
            obs(&t, self);
        }
        // Observers registered from inside a callback land after the existing ones.
        observers.append(&mut self.observers);
        self.observers = observers;
    }
}

pub enum AppMsg {
    UpdateField { field: FieldName, value: FieldValue },
    Submit { today: NaiveDate },
    SubmissionResolved(Result<HttpReply, TransportError>),
    Reset,
}

#[derive(Debug)]
pub enum Effect {
    PostSubmission {
        endpoint: String,
        record: NormalizedRecord,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

pub fn update(state: &mut FormController, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        UpdateField { field, value } => {
            if !state.phase.accepts_edits() {
                debug!(%field, phase = state.phase.label(), "edit ignored");
                return effects;
            }
            if !state.draft.set(field, value) {
                warn!(%field, "edit ignored: value does not fit field");
            }
        }
        Submit { today } => submit(state, today, &mut effects),
        SubmissionResolved(result) => {
            if state.phase != FormPhase::Submitting {
                warn!(phase = state.phase.label(), "stale submission result dropped");
                return effects;
            }
            let record = state.in_flight.take();
            match (interpret_reply(result), record) {
                (Ok(message), Some(record)) => {
                    state.outcome = SubmissionOutcome::Success {
                        record,
                        message: message.clone(),
                    };
                    state.draft = DraftRecord::default();
                    state.errors = FieldErrors::new();
                    state.enter(FormPhase::Succeeded);
                    effects.push(Effect::ShowToast {
                        text: message,
                        level: ToastLevel::Success,
                        seconds: 4,
                    });
                }
                (Ok(_), None) => {
                    // Submitting always carries a record; treat a missing one as a failed attempt.
                    fail(state, "Submission state was lost".into(), &mut effects);
                }
                (Err(message), _) => fail(state, message, &mut effects),
            }
        }
        Reset => {
            if !matches!(state.phase, FormPhase::Succeeded | FormPhase::Failed) {
                debug!(phase = state.phase.label(), "reset ignored");
                return effects;
            }
            state.draft = DraftRecord::default();
            state.errors = FieldErrors::new();
            state.outcome = SubmissionOutcome::Idle;
            state.in_flight = None;
            state.enter(FormPhase::Idle);
        }
    }
    effects
}

fn submit(state: &mut FormController, today: NaiveDate, effects: &mut Vec<Effect>) {
    if state.phase == FormPhase::Submitting {
        debug!("submit ignored: request already in flight");
        return;
    }
    if !state.phase.accepts_edits() {
        debug!(phase = state.phase.label(), "submit ignored");
        return;
    }
    if state.draft.is_untouched() {
        debug!("submit ignored: form untouched");
        return;
    }
    match validate(&state.draft, today) {
        Err(errors) => {
            let n = errors.len();
            let keys: Vec<&str> = errors.fields().map(FieldName::key).collect();
            info!(fields = ?keys, "validation failed");
            state.errors = errors;
            state.outcome = SubmissionOutcome::Idle;
            state.enter(FormPhase::Invalid);
            effects.push(Effect::ShowToast {
                text: format!(
                    "{n} field{} need{} attention",
                    if n == 1 { "" } else { "s" },
                    if n == 1 { "s" } else { "" }
                ),
                level: ToastLevel::Info,
                seconds: 3,
            });
        }
        Ok(record) => {
            state.errors = FieldErrors::new();
            let Some(endpoint) = state.endpoint.clone() else {
                warn!("submit failed: no endpoint configured");
                fail(state, MISSING_ENDPOINT_MESSAGE.into(), effects);
                return;
            };
            state.in_flight = Some(record.clone());
            state.outcome = SubmissionOutcome::InFlight;
            state.enter(FormPhase::Submitting);
            effects.push(Effect::PostSubmission { endpoint, record });
        }
    }
}

fn fail(state: &mut FormController, message: String, effects: &mut Vec<Effect>) {
    state.in_flight = None;
    state.outcome = SubmissionOutcome::Failure(message.clone());
    state.enter(FormPhase::Failed);
    effects.push(Effect::ShowToast {
        text: message,
        level: ToastLevel::Error,
        seconds: 5,
    });
}

fn body_message(body: &str) -> Option<String> {
    let v: JsonValue = serde_json::from_str(body).ok()?;
    v.get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Maps a transport result onto the message the user sees.
/// `Ok` carries the success message, `Err` the failure message.
pub(crate) fn interpret_reply(result: Result<HttpReply, TransportError>) -> Result<String, String> {
    match result {
        Err(_) => Err(NETWORK_ERROR_MESSAGE.to_string()),
        Ok(reply) if reply.is_success() => {
            Ok(body_message(&reply.body).unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()))
        }
        Ok(reply) => Err(body_message(&reply.body).unwrap_or_else(|| match &reply.reason {
            Some(reason) => format!("Error: {} {}", reply.status, reason),
            None => format!("Error: {}", reply.status),
        })),
    }
}
