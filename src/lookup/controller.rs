//! Debounced exact-match lookup.
//!
//! Every input change bumps a generation counter and aborts the pending
//! timer. A resolution is published only while holding the controller lock
//! and only if its generation is still the current one, so a lookup whose
//! timer fired just before new input arrived can never overwrite the state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use super::matcher::AnimalMatcher;
use crate::registry::RegistryAnimal;

/// Pause after the last keystroke before the exact-match lookup runs
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Found,
    FoundDeceased,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupResolution {
    /// Input generation this resolution answers
    pub generation: u64,
    pub full_id: String,
    pub kind: ResolutionKind,
    /// Lineage source; `None` for `NotFound`
    pub animal: Option<RegistryAnimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    /// Nothing typed
    Idle,
    /// Waiting for the debounce delay or the lookup itself
    Pending { generation: u64, full_id: String },
    Resolved(LookupResolution),
}

impl LookupState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, LookupState::Pending { .. })
    }

    pub fn resolution(&self) -> Option<&LookupResolution> {
        match self {
            LookupState::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Inflight {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    inflight: Mutex<Inflight>,
    state: watch::Sender<LookupState>,
}

impl Shared {
    /// Publish a resolution unless newer input has arrived since it was scheduled.
    async fn apply(&self, resolution: LookupResolution) -> bool {
        let inflight = self.inflight.lock().await;
        if inflight.generation != resolution.generation {
            debug!(
                "Dropping stale lookup for {} (generation {} < {})",
                resolution.full_id, resolution.generation, inflight.generation
            );
            return false;
        }
        self.state.send_replace(LookupState::Resolved(resolution));
        true
    }
}

pub struct LookupController {
    matcher: AnimalMatcher,
    delay: Duration,
    shared: Arc<Shared>,
}

impl LookupController {
    pub fn new(matcher: AnimalMatcher) -> Self {
        Self::with_delay(matcher, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(matcher: AnimalMatcher, delay: Duration) -> Self {
        let (state, _) = watch::channel(LookupState::Idle);
        Self {
            matcher,
            delay,
            shared: Arc::new(Shared {
                inflight: Mutex::new(Inflight::default()),
                state,
            }),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> LookupState {
        self.shared.state.borrow().clone()
    }

    /// Watch every state transition
    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.shared.state.subscribe()
    }

    /// Feed a change of the typed number or the session prefix.
    pub async fn on_input(&self, prefix: &str, query: &str) {
        let mut inflight = self.shared.inflight.lock().await;
        inflight.generation += 1;
        let generation = inflight.generation;
        if let Some(timer) = inflight.timer.take() {
            timer.abort();
        }

        let query = query.trim();
        if query.is_empty() {
            self.shared.state.send_replace(LookupState::Idle);
            return;
        }

        let full_id = format!("{prefix}{query}");
        self.shared.state.send_replace(LookupState::Pending {
            generation,
            full_id: full_id.clone(),
        });

        let matcher = self.matcher.clone();
        let shared = Arc::clone(&self.shared);
        let delay = self.delay;
        debug!("Lookup for {} scheduled in {:?} (generation {})", full_id, delay, generation);

        inflight.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let resolution = resolve(&matcher, generation, full_id).await;
            shared.apply(resolution).await;
        }));
    }

    /// Cancel anything pending and go back to `Idle`.
    pub async fn reset(&self) {
        let mut inflight = self.shared.inflight.lock().await;
        inflight.generation += 1;
        if let Some(timer) = inflight.timer.take() {
            timer.abort();
        }
        self.shared.state.send_replace(LookupState::Idle);
    }

    /// Wait until the state is no longer `Pending` and return it.
    pub async fn settled(&self) -> LookupState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(LookupState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl Drop for LookupController {
    fn drop(&mut self) {
        if let Ok(mut inflight) = self.shared.inflight.try_lock() {
            if let Some(timer) = inflight.timer.take() {
                timer.abort();
            }
        }
    }
}

async fn resolve(matcher: &AnimalMatcher, generation: u64, full_id: String) -> LookupResolution {
    let (kind, animal) = match matcher.lookup_animal(&full_id).await {
        Some(animal) if animal.is_deceased => (ResolutionKind::FoundDeceased, Some(animal)),
        Some(animal) => (ResolutionKind::Found, Some(animal)),
        None => (ResolutionKind::NotFound, None),
    };
    LookupResolution {
        generation,
        full_id,
        kind,
        animal,
    }
}
