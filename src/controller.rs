use log::{ info, warn, error };
use std::sync::{ Arc, Mutex, MutexGuard };

use crate::error::PlannerError;
use crate::models::chat::ChatEntry;
use crate::models::plan::{ DateRange, TripPlanResponse, TripRequest };
use crate::storage::{ PlanStore, SavedPlan };
use crate::transport::Transport;

const NO_ANSWER: &str = "(No answer returned)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    /// Single-shot form: the latest result replaces the previous one.
    Form,
    /// Conversation: every turn is appended to the history.
    Chat,
}

/// Interaction state owned by one controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub query: String,
    pub date_range: Option<DateRange>,
    pub loading: bool,
    pub error: Option<String>,
    pub plan: Option<TripPlanResponse>,
    pub history: Vec<ChatEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The response was decoded and applied to the state.
    Applied,
    /// The call failed; the error message is in the state.
    Failed(PlannerError),
    /// Blank input; no call was made.
    Invalid,
    /// A request is already in flight; no call was made.
    Busy,
    /// A newer request was issued while this one was in flight.
    Stale,
}

struct Inner {
    state: FormState,
    latest_seq: u64,
}

pub struct FormController {
    transport: Arc<dyn Transport>,
    mode: ControllerMode,
    inner: Mutex<Inner>,
}

impl FormController {
    pub fn new(transport: Arc<dyn Transport>, mode: ControllerMode) -> Self {
        Self {
            transport,
            mode,
            inner: Mutex::new(Inner {
                state: FormState::default(),
                latest_seq: 0,
            }),
        }
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> FormState {
        self.lock().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    /// Submits `input`. At most one request is in flight per controller;
    /// the lock is released before the transport is awaited.
    pub async fn submit(&self, input: &str, date_range: Option<DateRange>) -> SubmitOutcome {
        let date_range = date_range.filter(|r| !r.is_empty());

        let (request, seq) = {
            let mut inner = self.lock();
            if inner.state.loading {
                warn!("Submit ignored, request #{} still in flight", inner.latest_seq);
                return SubmitOutcome::Busy;
            }
            let request = match TripRequest::new(input, date_range) {
                Some(req) => req,
                None => {
                    inner.state.error = Some(PlannerError::Validation.to_string());
                    return SubmitOutcome::Invalid;
                }
            };
            inner.latest_seq += 1;
            let state = &mut inner.state;
            state.loading = true;
            state.error = None;
            state.query = request.query.clone();
            state.date_range = request.date_range;
            if self.mode == ControllerMode::Chat {
                state.history.push(ChatEntry::user(request.query.clone()));
            }
            (request, inner.latest_seq)
        };

        info!("Submitting request #{}: '{}'", seq, request.query);
        let result = self.transport.send(&request).await;

        let mut inner = self.lock();
        if inner.latest_seq != seq {
            warn!("Discarding response #{} (latest is #{})", seq, inner.latest_seq);
            return SubmitOutcome::Stale;
        }

        let state = &mut inner.state;
        state.loading = false;
        match result {
            Ok(response) => {
                if self.mode == ControllerMode::Chat {
                    let answer = response.answer
                        .as_deref()
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .unwrap_or(NO_ANSWER);
                    state.history.push(ChatEntry::assistant(answer, response.references.clone()));
                }
                state.error = None;
                state.plan = Some(response);
                SubmitOutcome::Applied
            }
            Err(e) => {
                error!("Request #{} failed: {}", seq, e);
                state.error = Some(e.to_string());
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Abandons the in-flight request, if any. Its response is discarded
    /// when it arrives.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if inner.state.loading {
            info!("Abandoning request #{}", inner.latest_seq);
        }
        inner.latest_seq += 1;
        inner.state.loading = false;
    }

    pub fn save_plan(&self, store: &PlanStore) -> Result<(), PlannerError> {
        let snapshot = {
            let inner = self.lock();
            let state = &inner.state;
            let (plans, timeline) = state.plan
                .as_ref()
                .map(|p| (p.ideas.clone(), p.timeline.clone()))
                .unwrap_or_default();
            SavedPlan {
                query: state.query.clone(),
                date: state.date_range,
                plans,
                timeline,
            }
        };
        store.save(&snapshot)
    }

    /// Restores query, dates and results from the store. Returns whether a
    /// saved plan was found.
    pub fn load_saved_plan(&self, store: &PlanStore) -> Result<bool, PlannerError> {
        let saved = match store.load()? {
            Some(saved) => saved,
            None => return Ok(false),
        };
        let mut inner = self.lock();
        let state = &mut inner.state;
        state.query = saved.query;
        state.date_range = saved.date;
        state.plan = Some(TripPlanResponse {
            ideas: saved.plans,
            timeline: saved.timeline,
            ..Default::default()
        });
        Ok(true)
    }
}
