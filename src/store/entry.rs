//! Weighing entry types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::prefs::SessionPrefs;
use crate::registry::RegistryAnimal;

/// Notes stored when the operator leaves the field empty
pub const DEFAULT_NOTES: &str = "Registro directo.";

/// Operator input that cannot be submitted
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("weight must be a number greater than zero (got {0:?})")]
    InvalidWeight(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("weight and breed are required for the diagnostic")]
    MissingDiagnosticInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::InProgress => write!(f, "IN_PROGRESS"),
            TestStatus::Completed => write!(f, "COMPLETED"),
            TestStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Which end of the feeding test is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    /// Weigh-in (T-Start)
    Start,
    /// Weigh-out (T-End)
    End,
}

impl TestPhase {
    pub fn status(&self) -> TestStatus {
        match self {
            TestPhase::Start => TestStatus::InProgress,
            TestPhase::End => TestStatus::Completed,
        }
    }
}

impl std::fmt::Display for TestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestPhase::Start => write!(f, "T-Start"),
            TestPhase::End => write!(f, "T-End"),
        }
    }
}

/// One submitted weighing. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEntry {
    pub date: String,
    pub animal_id: String,
    pub breed: String,
    pub weight: f64,
    pub shed: String,
    pub pen: String,
    pub mother: String,
    pub father: String,
    pub birth_date: String,
    pub start_time: DateTime<Utc>,
    /// Always serialized so every record exposes the same columns
    pub end_time: Option<DateTime<Utc>>,
    pub status: TestStatus,
    pub notes: String,
}

impl TestEntry {
    /// Build an entry from a validated form.
    pub fn from_form(form: &FormState, weight: f64, phase: TestPhase, now: DateTime<Utc>) -> Self {
        let notes = form.notes.trim();
        Self {
            date: form.date.clone(),
            animal_id: form.full_id(),
            breed: form.breed.clone(),
            weight,
            shed: form.shed.clone(),
            pen: form.pen.clone(),
            mother: form.mother.clone(),
            father: form.father.clone(),
            birth_date: form.birth_date.clone(),
            start_time: now,
            end_time: match phase {
                TestPhase::Start => None,
                TestPhase::End => Some(now),
            },
            status: phase.status(),
            notes: if notes.is_empty() { DEFAULT_NOTES.to_string() } else { notes.to_string() },
        }
    }
}

/// An entry as persisted by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    /// Unique identifier
    pub id: String,
    /// When the store accepted the entry
    pub saved_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: TestEntry,
}

impl StoredEntry {
    pub fn new(entry: TestEntry) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            saved_at: Utc::now(),
            entry,
        }
    }
}

/// What the operator is editing before submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub date: String,
    pub tattoo_prefix: String,
    pub animal_number: String,
    pub breed: String,
    /// Raw text, validated on submit
    pub weight: String,
    pub shed: String,
    pub pen: String,
    pub mother: String,
    pub father: String,
    pub birth_date: String,
    pub notes: String,
}

impl FormState {
    pub fn new(prefs: &SessionPrefs, today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            tattoo_prefix: prefs.tattoo_prefix.clone(),
            animal_number: String::new(),
            breed: String::new(),
            weight: String::new(),
            shed: prefs.shed.clone(),
            pen: prefs.pen.clone(),
            mother: RegistryAnimal::PLACEHOLDER.to_string(),
            father: RegistryAnimal::PLACEHOLDER.to_string(),
            birth_date: RegistryAnimal::PLACEHOLDER.to_string(),
            notes: String::new(),
        }
    }

    /// Session prefix joined with the typed number
    pub fn full_id(&self) -> String {
        format!("{}{}", self.tattoo_prefix, self.animal_number.trim())
    }

    pub fn apply_lineage(&mut self, animal: &RegistryAnimal) {
        self.breed = animal.breed.clone();
        self.mother = animal.mother.clone();
        self.father = animal.father.clone();
        self.birth_date = animal.birth_date.clone();
    }

    /// Positive, finite weight or a validation error
    pub fn parse_weight(&self) -> Result<f64, ValidationError> {
        let raw = self.weight.trim();
        match raw.replace(',', ".").parse::<f64>() {
            Ok(weight) if weight.is_finite() && weight > 0.0 => Ok(weight),
            _ => Err(ValidationError::InvalidWeight(raw.to_string())),
        }
    }

    /// Checks run before anything is stored; yields the parsed weight.
    pub fn validate(&self) -> Result<f64, ValidationError> {
        if self.animal_number.trim().is_empty() {
            return Err(ValidationError::MissingField("animal number"));
        }
        self.parse_weight()
    }

    /// Clear the per-animal fields, keeping date and session location.
    pub fn clear_animal(&mut self) {
        self.animal_number.clear();
        self.breed.clear();
        self.weight.clear();
        self.mother = RegistryAnimal::PLACEHOLDER.to_string();
        self.father = RegistryAnimal::PLACEHOLDER.to_string();
        self.birth_date = RegistryAnimal::PLACEHOLDER.to_string();
        self.notes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormState {
        let prefs = SessionPrefs {
            tattoo_prefix: "ABC-".into(),
            shed: "G1".into(),
            pen: "C3".into(),
        };
        FormState::new(&prefs, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    }

    #[test]
    fn test_new_form_uses_prefs_and_placeholders() {
        let form = form();
        assert_eq!(form.date, "2024-03-09");
        assert_eq!(form.tattoo_prefix, "ABC-");
        assert_eq!(form.shed, "G1");
        assert_eq!(form.pen, "C3");
        assert_eq!(form.mother, "-");
        assert!(form.breed.is_empty());
    }

    #[test]
    fn test_weight_validation() {
        let mut form = form();
        for bad in ["", "abc", "0", "-12", "NaN", "inf"] {
            form.weight = bad.into();
            assert!(matches!(form.parse_weight(), Err(ValidationError::InvalidWeight(_))), "{bad}");
        }
        form.weight = " 352.5 ".into();
        assert_eq!(form.parse_weight().unwrap(), 352.5);
        form.weight = "410,2".into();
        assert_eq!(form.parse_weight().unwrap(), 410.2);
    }

    #[test]
    fn test_validate_requires_number() {
        let mut form = form();
        form.weight = "300".into();
        assert_eq!(form.validate(), Err(ValidationError::MissingField("animal number")));
        form.animal_number = "045".into();
        assert_eq!(form.validate(), Ok(300.0));
    }

    #[test]
    fn test_entry_from_form_by_phase() {
        let mut form = form();
        form.animal_number = " 045 ".into();
        let now = Utc::now();

        let start = TestEntry::from_form(&form, 300.0, TestPhase::Start, now);
        assert_eq!(start.animal_id, "ABC-045");
        assert_eq!(start.status, TestStatus::InProgress);
        assert!(start.end_time.is_none());
        assert_eq!(start.notes, DEFAULT_NOTES);

        form.notes = "Cojera leve".into();
        let end = TestEntry::from_form(&form, 380.0, TestPhase::End, now);
        assert_eq!(end.status, TestStatus::Completed);
        assert_eq!(end.end_time, Some(now));
        assert_eq!(end.notes, "Cojera leve");
    }

    #[test]
    fn test_stored_entry_serializes_flat() {
        let form = form();
        let stored = StoredEntry::new(TestEntry::from_form(&form, 1.0, TestPhase::Start, Utc::now()));
        let json = serde_json::to_value(&stored).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(&keys[..4], &["id", "savedAt", "date", "animalId"]);
        assert_eq!(json["status"], "IN_PROGRESS");
        assert!(json["endTime"].is_null());

        let back: StoredEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);
    }

    #[test]
    fn test_clear_animal_keeps_session_fields() {
        let mut form = form();
        form.animal_number = "045".into();
        form.breed = "Angus".into();
        form.weight = "300".into();
        form.mother = "M1".into();
        form.clear_animal();
        assert_eq!(form.tattoo_prefix, "ABC-");
        assert_eq!(form.shed, "G1");
        assert!(form.animal_number.is_empty());
        assert!(form.breed.is_empty());
        assert_eq!(form.mother, "-");
    }
}
