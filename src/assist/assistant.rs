use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::provider::LLMProvider;

/// Returned when the model answers with nothing usable
pub const EMPTY_FALLBACK: &str = "Sin sugerencias disponibles.";
/// Returned when the model cannot be reached (or none is configured)
pub const ERROR_FALLBACK: &str = "Error al generar sugerencia.";

const SYSTEM_PROMPT: &str = "Eres un asistente experto en control de calidad de pruebas de \
    alimentación bovina. Respondes en español, con un máximo de 2 frases, en tono técnico.";

/// What the diagnostic gets to see about an animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalSnapshot {
    pub animal_id: String,
    pub breed: String,
    pub weight: String,
    pub birth_date: String,
}

/// Opaque text assist; every call yields some text.
#[derive(Clone)]
pub struct Assistant {
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
}

impl Assistant {
    pub fn new(provider: Option<Arc<dyn LLMProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Rewrite free-text notes into a short professional observation.
    pub async fn improve_notes(&self, notes: &str) -> String {
        let prompt = format!(
            "Basándote en el siguiente contexto de prueba: \"{}\", genera una breve observación \
             profesional (máximo 2 frases) para el informe técnico.",
            notes.trim()
        );
        self.ask(prompt).await
    }

    /// Short performance diagnostic for one animal.
    pub async fn diagnose(&self, snapshot: &AnimalSnapshot) -> String {
        let prompt = format!(
            "Animal {} de raza {}, nacido el {}, pesa {} kg. Evalúa brevemente si el peso es \
             coherente con la raza y la edad y sugiere una observación para el informe.",
            snapshot.animal_id, snapshot.breed, snapshot.birth_date, snapshot.weight
        );
        self.ask(prompt).await
    }

    async fn ask(&self, prompt: String) -> String {
        let Some(provider) = &self.provider else {
            debug!("Assist requested but no provider is configured");
            return ERROR_FALLBACK.to_string();
        };

        match provider.generate(&self.model, prompt, Some(SYSTEM_PROMPT.to_string())).await {
            Ok(text) if text.trim().is_empty() => EMPTY_FALLBACK.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Assist call failed: {:#}", e);
                ERROR_FALLBACK.to_string()
            }
        }
    }
}
