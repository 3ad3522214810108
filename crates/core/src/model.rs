//! Model tiers: named buckets selecting which model identifier to use.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::error::SessionError;

/// A model tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Fastest responses, good for casual conversation
    Fast,
    /// Balance of speed and quality
    #[default]
    Balanced,
    /// Strongest reasoning, long context
    Smart,
    /// Best at detailed explanations
    Coding,
}

impl ModelTier {
    pub const ALL: [ModelTier; 4] = [
        ModelTier::Fast,
        ModelTier::Balanced,
        ModelTier::Smart,
        ModelTier::Coding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Balanced => "balanced",
            ModelTier::Smart => "smart",
            ModelTier::Coding => "coding",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            ModelTier::Fast => "fastest, well suited to conversation",
            ModelTier::Balanced => "balances speed and quality",
            ModelTier::Smart => "smart, long context",
            ModelTier::Coding => "best for detailed explanations",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(ModelTier::Fast),
            "balanced" => Ok(ModelTier::Balanced),
            "smart" => Ok(ModelTier::Smart),
            "coding" => Ok(ModelTier::Coding),
            _ => Err(SessionError::UnknownTier(s.trim().to_string())),
        }
    }
}

/// The tier currently bound to a session and the model it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub tier: ModelTier,
    pub model_name: String,
}

/// Tier → model identifier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    models: BTreeMap<ModelTier, String>,
}

impl ModelCatalog {
    pub fn new(
        fast: impl Into<String>,
        balanced: impl Into<String>,
        smart: impl Into<String>,
        coding: impl Into<String>,
    ) -> Self {
        let models = BTreeMap::from([
            (ModelTier::Fast, fast.into()),
            (ModelTier::Balanced, balanced.into()),
            (ModelTier::Smart, smart.into()),
            (ModelTier::Coding, coding.into()),
        ]);
        Self { models }
    }

    /// The model identifier for a tier. Every tier is always present.
    pub fn model_for(&self, tier: ModelTier) -> &str {
        self.models.get(&tier).map(|s| s.as_str()).unwrap_or_default()
    }

    pub fn select(&self, tier: ModelTier) -> ModelSelection {
        ModelSelection {
            tier,
            model_name: self.model_for(tier).to_string(),
        }
    }

    /// Describe the catalogue with `current` marked as the active selection.
    pub fn info(&self, current: &ModelSelection) -> ModelInfo {
        let descriptions = self
            .models
            .iter()
            .map(|(tier, model)| (*tier, format!("{model} - {}", tier.summary())))
            .collect();
        ModelInfo {
            current: current.clone(),
            available: self.models.clone(),
            descriptions,
            cost_note: "All tiers are free to use on the default provider.".into(),
        }
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(
            "llama-3.1-8b-instant",
            "llama3-70b-8192",
            "mixtral-8x7b-32768",
            "llama-3.2-90b-text-preview",
        )
    }
}

/// Snapshot returned to callers asking which models are available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub current: ModelSelection,
    pub available: BTreeMap<ModelTier, String>,
    pub descriptions: BTreeMap<ModelTier, String>,
    pub cost_note: String,
}
