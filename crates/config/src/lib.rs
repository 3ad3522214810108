//! Configuration loading, validation, and management for Parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Every setting has a default except the API key,
//! which the tutor session refuses to start without.

use chrono::FixedOffset;
use parley_core::model::{ModelCatalog, ModelTier};
use parley_core::profile::{LearnerProfile, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the language-model service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider name (used in logs and for the default base URL)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Tier selected when a session starts
    #[serde(default)]
    pub default_tier: ModelTier,

    /// Model identifier per tier
    #[serde(default)]
    pub models: ModelsConfig,

    /// Learner profile defaults and conversation settings
    #[serde(default)]
    pub tutor: TutorConfig,

    /// Reasoning loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Document corpus and knowledge lookup settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Local clock settings
    #[serde(default)]
    pub clock: ClockConfig,
}

fn default_provider() -> String {
    "groq".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("default_tier", &self.default_tier)
            .field("models", &self.models)
            .field("tutor", &self.tutor)
            .field("agent", &self.agent)
            .field("knowledge", &self.knowledge)
            .field("clock", &self.clock)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_fast_model")]
    pub fast: String,

    #[serde(default = "default_balanced_model")]
    pub balanced: String,

    #[serde(default = "default_smart_model")]
    pub smart: String,

    #[serde(default = "default_coding_model")]
    pub coding: String,
}

fn default_fast_model() -> String {
    ModelCatalog::default().model_for(ModelTier::Fast).into()
}
fn default_balanced_model() -> String {
    ModelCatalog::default().model_for(ModelTier::Balanced).into()
}
fn default_smart_model() -> String {
    ModelCatalog::default().model_for(ModelTier::Smart).into()
}
fn default_coding_model() -> String {
    ModelCatalog::default().model_for(ModelTier::Coding).into()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            fast: default_fast_model(),
            balanced: default_balanced_model(),
            smart: default_smart_model(),
            coding: default_coding_model(),
        }
    }
}

impl ModelsConfig {
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(&self.fast, &self.balanced, &self.smart, &self.coding)
    }
}

/// Whether turns go straight to the model or through the tool-using loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// One memory-threaded completion per turn, no tools
    Direct,
    /// Think/act/observe loop with the tool set
    #[default]
    Agent,
}

impl std::str::FromStr for ConversationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(ConversationMode::Direct),
            "agent" | "tools" => Ok(ConversationMode::Agent),
            other => Err(ConfigError::ValidationError(format!(
                "unknown conversation mode '{other}' (expected 'direct' or 'agent')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub level: Level,

    #[serde(default = "default_native_language")]
    pub native_language: String,

    #[serde(default = "default_goal")]
    pub goal: String,

    #[serde(default = "default_focus_areas")]
    pub focus_areas: BTreeSet<String>,

    #[serde(default)]
    pub mode: ConversationMode,

    /// Number of turn-pairs visible to the model
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,

    /// Temperature for direct conversation
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,

    /// Max tokens for direct conversation
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,

    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,
}

fn default_native_language() -> String {
    LearnerProfile::default().native_language
}
fn default_goal() -> String {
    LearnerProfile::default().goal
}
fn default_focus_areas() -> BTreeSet<String> {
    LearnerProfile::default().focus_areas
}
fn default_memory_window() -> usize {
    5
}
fn default_chat_temperature() -> f32 {
    0.7
}
fn default_chat_max_tokens() -> u32 {
    500
}
fn default_analysis_temperature() -> f32 {
    0.3
}
fn default_analysis_max_tokens() -> u32 {
    800
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            level: Level::default(),
            native_language: default_native_language(),
            goal: default_goal(),
            focus_areas: default_focus_areas(),
            mode: ConversationMode::default(),
            memory_window: default_memory_window(),
            temperature: default_chat_temperature(),
            max_tokens: default_chat_max_tokens(),
            analysis_temperature: default_analysis_temperature(),
            analysis_max_tokens: default_analysis_max_tokens(),
        }
    }
}

impl TutorConfig {
    pub fn profile(&self) -> LearnerProfile {
        LearnerProfile {
            level: self.level,
            focus_areas: self.focus_areas.clone(),
            native_language: self.native_language.clone(),
            goal: self.goal.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum think steps per turn
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    #[serde(default = "default_agent_temperature")]
    pub temperature: f32,

    #[serde(default = "default_agent_max_tokens")]
    pub max_tokens: u32,

    /// Wall-clock limit for one language-model call
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,

    /// Wall-clock limit for one tool invocation
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_max_steps() -> u32 {
    8
}
fn default_agent_temperature() -> f32 {
    0.3
}
fn default_agent_max_tokens() -> u32 {
    1024
}
fn default_llm_timeout() -> u64 {
    60
}
fn default_tool_timeout() -> u64 {
    20
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            temperature: default_agent_temperature(),
            max_tokens: default_agent_max_tokens(),
            llm_timeout_secs: default_llm_timeout(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

/// Which passage index backs the Document Retrieval tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverKind {
    #[default]
    Keyword,
    Embedding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Text file indexed at startup for document retrieval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<String>,

    #[serde(default)]
    pub retriever: RetrieverKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Passages returned per document query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Knowledge lookup summary length in characters
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,

    /// Candidates listed for an ambiguous lookup
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Wikipedia language edition
    #[serde(default = "default_wiki_language")]
    pub wiki_language: String,
}

fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    100
}
fn default_top_k() -> usize {
    3
}
fn default_summary_chars() -> usize {
    500
}
fn default_max_candidates() -> usize {
    5
}
fn default_wiki_language() -> String {
    "en".into()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            retriever: RetrieverKind::default(),
            embedding_model: None,
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            summary_chars: default_summary_chars(),
            max_candidates: default_max_candidates(),
            wiki_language: default_wiki_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Fixed offset from UTC used for displayed times and calendar input, e.g. "+07:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_utc_offset() -> String {
    "+07:00".into()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

impl ClockConfig {
    /// Parse `utc_offset` (`+HH:MM`, `-HH:MM`, or `Z`).
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset)
    }
}

fn parse_utc_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::ValidationError(format!("invalid utc_offset '{raw}' (expected +HH:MM)"));
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match raw.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// Also checks environment variables:
    /// - `PARLEY_API_KEY` (highest priority), `GROQ_API_KEY`, `OPENAI_API_KEY`
    /// - `PARLEY_BASE_URL`
    /// - `PARLEY_TIER`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if !self.has_api_key() {
            self.api_key = ["PARLEY_API_KEY", "GROQ_API_KEY", "OPENAI_API_KEY"]
                .into_iter()
                .filter_map(|name| lookup(name))
                .find(|key| !key.trim().is_empty());
        }

        if let Some(url) = lookup("PARLEY_BASE_URL") {
            self.base_url = Some(url);
        }

        if let Some(tier) = lookup("PARLEY_TIER") {
            self.default_tier = tier
                .parse()
                .map_err(|e: parley_core::error::SessionError| ConfigError::ValidationError(e.to_string()))?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, temperature) in [
            ("tutor.temperature", self.tutor.temperature),
            ("tutor.analysis_temperature", self.tutor.analysis_temperature),
            ("agent.temperature", self.agent.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.tutor.memory_window == 0 {
            return Err(ConfigError::ValidationError(
                "tutor.memory_window must be at least 1".into(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        if self.knowledge.chunk_size == 0 || self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_overlap must be smaller than a non-zero knowledge.chunk_size".into(),
            ));
        }

        if self.knowledge.retriever == RetrieverKind::Embedding && self.knowledge.embedding_model.is_none() {
            return Err(ConfigError::ValidationError(
                "knowledge.embedding_model is required when knowledge.retriever = \"embedding\"".into(),
            ));
        }

        self.clock.offset()?;
        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// The base URL to send requests to.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| default_base_url(&self.provider))
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            base_url: None,
            default_tier: ModelTier::default(),
            models: ModelsConfig::default(),
            tutor: TutorConfig::default(),
            agent: AgentSettings::default(),
            knowledge: KnowledgeConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

/// Get the default base URL for well-known OpenAI-compatible providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "groq" => "https://api.groq.com/openai/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "groq");
        assert_eq!(config.default_tier, ModelTier::Balanced);
        assert_eq!(config.tutor.memory_window, 5);
        assert_eq!(config.knowledge.chunk_size, 500);
        assert_eq!(config.knowledge.chunk_overlap, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.models.fast, config.models.fast);
        assert_eq!(parsed.clock.utc_offset, "+07:00");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.tutor.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.knowledge.chunk_overlap = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn embedding_retriever_requires_model() {
        let mut config = AppConfig::default();
        config.knowledge.retriever = RetrieverKind::Embedding;
        assert!(config.validate().is_err());
        config.knowledge.embedding_model = Some("text-embedding-3-small".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider, "groq");
        assert!(!config.has_api_key());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_tier = "fast"

[tutor]
level = "intermediate"
memory_window = 3

[models]
fast = "llama-3.3-70b-versatile"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_tier, ModelTier::Fast);
        assert_eq!(config.tutor.level, Level::Intermediate);
        assert_eq!(config.tutor.memory_window, 3);
        assert_eq!(config.models.fast, "llama-3.3-70b-versatile");
        assert_eq!(config.models.balanced, "llama3-70b-8192");
        assert_eq!(config.agent.max_steps, 8);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_tier = [not toml").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_in_priority_order() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GROQ_API_KEY", "gsk-groq"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("PARLEY_TIER", "smart"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gsk-groq"));
        assert_eq!(config.default_tier, ModelTier::Smart);
    }

    #[test]
    fn blank_file_key_is_not_a_credential() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_key = \"  \"\n").unwrap();

        let mut config = AppConfig::load_from(&path).unwrap();
        assert!(!config.has_api_key());

        config
            .apply_env(|key| (key == "GROQ_API_KEY").then(|| "gsk-env".to_string()))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gsk-env"));
        assert!(config.has_api_key());
    }

    #[test]
    fn blank_env_key_falls_through_to_next() {
        let env: HashMap<&str, &str> =
            HashMap::from([("PARLEY_API_KEY", ""), ("GROQ_API_KEY", "gsk-groq")]);
        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gsk-groq"));
    }

    #[test]
    fn env_unknown_tier_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| (key == "PARLEY_TIER").then(|| "turbo".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("gsk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parses_utc_offsets() {
        assert_eq!(parse_utc_offset("+07:00").unwrap().local_minus_utc(), 7 * 3600);
        assert_eq!(parse_utc_offset("-03:30").unwrap().local_minus_utc(), -(3 * 3600 + 1800));
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("07:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("groq").contains("api.groq.com"));
        assert!(AppConfig::default().resolved_base_url().contains("groq"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("groq"));
        assert!(toml_str.contains("+07:00"));
    }
}
