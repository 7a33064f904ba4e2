//! Weigh station workflow.
//!
//! Glues the form being edited to the lookup machinery, the record store,
//! remote sync and the assistant. Front ends talk to this type only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::assist::{AnimalSnapshot, Assistant};
use crate::config::StationConfig;
use crate::export::{CsvExporter, ExportOutcome, ReportKind};
use crate::lookup::{AnimalMatcher, LookupController, LookupState, ResolutionKind};
use crate::registry::{HttpCsvSource, RegistryAnimal, RegistryCache};
use crate::store::{FormState, KeyStore, RecordStore, SessionPrefs, StoredEntry, TestEntry, TestPhase, ValidationError};
use crate::sync::RemoteSync;

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(StoredEntry),
    /// The animal is registered as deceased; resubmit with confirmation
    NeedsConfirmation { animal_id: String },
}

pub struct WeighStation {
    phase: TestPhase,
    form: Mutex<FormState>,
    /// Generation of the last resolution copied into the form
    autofilled: AtomicU64,
    matcher: AnimalMatcher,
    controller: LookupController,
    records: Arc<RecordStore>,
    keystore: KeyStore,
    exporter: CsvExporter,
    sync: Arc<RemoteSync>,
    assistant: Assistant,
}

/// Everything a station needs, already built
pub struct StationParts {
    pub cache: Arc<RegistryCache>,
    pub records: Arc<RecordStore>,
    pub keystore: KeyStore,
    pub exporter: CsvExporter,
    pub sync: Arc<RemoteSync>,
    pub assistant: Assistant,
    pub debounce: std::time::Duration,
}

impl StationParts {
    /// Wire the production components described by `config`.
    pub async fn from_config(config: &StationConfig) -> Result<Self> {
        let cache = Arc::new(RegistryCache::new(
            Arc::new(HttpCsvSource::new("registry", config.registry_url.clone())),
            Arc::new(HttpCsvSource::new("deceased", config.deceased_url.clone())),
        ));
        let keystore = KeyStore::new(config.data_dir.clone());
        let records = Arc::new(RecordStore::open(keystore.clone()).await?);

        Ok(Self {
            cache,
            records,
            keystore,
            exporter: CsvExporter::new(config.export_dir.clone()),
            sync: Arc::new(RemoteSync::new(config.sync_url.clone())),
            assistant: Assistant::new(crate::assist::build_provider(&config.assist), config.assist_model.clone()),
            debounce: config.debounce,
        })
    }
}

impl WeighStation {
    /// Open a station for one phase, prefilled from the saved session prefs.
    pub async fn open(parts: StationParts, phase: TestPhase) -> Result<Self> {
        let prefs = SessionPrefs::load(&parts.keystore).await?;
        let form = FormState::new(&prefs, Utc::now().date_naive());
        let matcher = AnimalMatcher::new(parts.cache);

        Ok(Self {
            phase,
            form: Mutex::new(form),
            autofilled: AtomicU64::new(0),
            controller: LookupController::with_delay(matcher.clone(), parts.debounce),
            matcher,
            records: parts.records,
            keystore: parts.keystore,
            exporter: parts.exporter,
            sync: parts.sync,
            assistant: parts.assistant,
        })
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub async fn form(&self) -> FormState {
        self.form.lock().await.clone()
    }

    pub fn lookup_state(&self) -> LookupState {
        self.controller.state()
    }

    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    /// Set prefix, shed and pen for the session and remember them.
    pub async fn configure(&self, prefix: &str, shed: &str, pen: &str) -> Result<()> {
        let prefs = SessionPrefs {
            tattoo_prefix: prefix.trim().to_string(),
            shed: shed.trim().to_string(),
            pen: pen.trim().to_string(),
        };
        for (name, value) in [("prefix", &prefs.tattoo_prefix), ("shed", &prefs.shed), ("pen", &prefs.pen)] {
            if value.is_empty() {
                return Err(ValidationError::MissingField(name).into());
            }
        }
        prefs.save(&self.keystore).await?;

        let number = {
            let mut form = self.form.lock().await;
            form.tattoo_prefix = prefs.tattoo_prefix.clone();
            form.shed = prefs.shed.clone();
            form.pen = prefs.pen.clone();
            form.animal_number.clone()
        };

        // A prefix change is an input change for the lookup
        self.controller.on_input(&prefs.tattoo_prefix, &number).await;
        Ok(())
    }

    /// Record the typed number; returns the live suggestions for it.
    pub async fn set_animal_number(&self, number: &str) -> Vec<RegistryAnimal> {
        let prefix = {
            let mut form = self.form.lock().await;
            form.animal_number = number.to_string();
            form.tattoo_prefix.clone()
        };

        self.controller.on_input(&prefix, number).await;
        self.matcher.search_animals(number, &prefix).await
    }

    /// Take a suggestion: the number loses the session prefix and lineage is filled in.
    pub async fn select_suggestion(&self, animal: &RegistryAnimal) {
        let (prefix, number) = {
            let mut form = self.form.lock().await;
            form.animal_number = strip_prefix(&animal.id, &form.tattoo_prefix);
            form.apply_lineage(animal);
            (form.tattoo_prefix.clone(), form.animal_number.clone())
        };

        self.controller.on_input(&prefix, &number).await;
    }

    /// Typed or corrected breed; later settles of the same lookup keep it.
    pub async fn set_breed(&self, breed: &str) {
        self.form.lock().await.breed = breed.trim().to_string();
    }

    pub async fn set_weight(&self, weight: &str) {
        self.form.lock().await.weight = weight.trim().to_string();
    }

    pub async fn set_date(&self, date: &str) {
        self.form.lock().await.date = date.trim().to_string();
    }

    pub async fn set_notes(&self, notes: &str) {
        self.form.lock().await.notes = notes.to_string();
    }

    /// Wait for the pending lookup and autofill lineage from it.
    ///
    /// Each resolution fills the form once, so later manual edits stick. A
    /// miss leaves whatever the form already holds.
    pub async fn settle_lookup(&self) -> LookupState {
        let state = self.controller.settled().await;
        if let Some(resolution) = state.resolution() {
            if let Some(animal) = &resolution.animal {
                let mut form = self.form.lock().await;
                if self.autofilled.swap(resolution.generation, Ordering::SeqCst) != resolution.generation {
                    form.apply_lineage(animal);
                }
            }
        }
        state
    }

    /// Validate and store the current form.
    ///
    /// Deceased animals are only stored with `confirm_deceased`. Nothing is
    /// written when validation fails.
    pub async fn submit(&self, confirm_deceased: bool) -> Result<SubmitOutcome> {
        let state = self.settle_lookup().await;
        let mut form = self.form.lock().await;

        let weight = form.validate()?;

        let deceased = state
            .resolution()
            .is_some_and(|r| r.kind == ResolutionKind::FoundDeceased);
        if deceased && !confirm_deceased {
            return Ok(SubmitOutcome::NeedsConfirmation {
                animal_id: form.full_id(),
            });
        }

        let entry = TestEntry::from_form(&form, weight, self.phase, Utc::now());
        let stored = self.records.append(entry).await?;
        if deceased {
            warn!("Stored {} although it is registered as deceased", stored.entry.animal_id);
        }
        info!("{} saved for {} ({} kg)", self.phase, stored.entry.animal_id, stored.entry.weight);

        self.sync.push_in_background(stored.clone());

        form.clear_animal();
        drop(form);
        self.controller.reset().await;

        Ok(SubmitOutcome::Saved(stored))
    }

    /// Ask the assistant for a diagnostic and keep it as the notes.
    pub async fn diagnose(&self) -> Result<String, ValidationError> {
        let snapshot = {
            let form = self.form.lock().await;
            if form.weight.trim().is_empty() || form.breed.trim().is_empty() {
                return Err(ValidationError::MissingDiagnosticInput);
            }
            AnimalSnapshot {
                animal_id: form.full_id(),
                breed: form.breed.clone(),
                weight: form.weight.clone(),
                birth_date: form.birth_date.clone(),
            }
        };

        let diagnostic = self.assistant.diagnose(&snapshot).await;
        self.form.lock().await.notes = diagnostic.clone();
        Ok(diagnostic)
    }

    /// Rewrite the current notes through the assistant.
    pub async fn improve_notes(&self) -> String {
        let notes = self.form.lock().await.notes.clone();
        let improved = self.assistant.improve_notes(&notes).await;
        self.form.lock().await.notes = improved.clone();
        improved
    }

    pub async fn list_records(&self) -> Vec<StoredEntry> {
        self.records.list().await
    }

    /// Wipe the local log. Confirmation is the caller's job.
    pub async fn clear_records(&self) -> Result<()> {
        self.records.clear().await
    }

    pub async fn export(&self, kind: ReportKind) -> Result<ExportOutcome> {
        kind.export(&self.records, &self.exporter).await
    }
}

/// Number part of a registry id under the session prefix (case-insensitive).
fn strip_prefix(id: &str, prefix: &str) -> String {
    let prefix = prefix.trim();
    match id.get(..prefix.len()) {
        Some(head) if !prefix.is_empty() && head.eq_ignore_ascii_case(prefix) => id[prefix.len()..].trim().to_string(),
        _ => id.to_string(),
    }
}
