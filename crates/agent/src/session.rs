//! Tutor session: one learner's conversation with the tutor.
//!
//! The session owns everything mutable about a conversation (profile,
//! model selection, memory, mode) and shares the provider, tool registry
//! and event bus. Taking `&mut self` for a turn means a session handles one
//! turn at a time; independent sessions can run concurrently.
//!
//! Faults inside a turn never escape: the learner gets an apology in
//! their own language and the session stays usable.

use chrono::Utc;
use parley_config::{AgentSettings, AppConfig, ConversationMode, TutorConfig};
use parley_core::error::{ProviderError, SessionError};
use parley_core::event::{DomainEvent, EventBus};
use parley_core::message::{Message, Turn};
use parley_core::model::{ModelCatalog, ModelInfo, ModelSelection, ModelTier};
use parley_core::profile::{LearnerProfile, Level};
use parley_core::provider::{Provider, ProviderRequest};
use parley_core::tool::ToolRegistry;
use parley_memory::ConversationMemory;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::locale::Locale;
use crate::prompt::{build_analysis_prompt, build_system_prompt, ANALYSIS_SYSTEM_PROMPT};
use crate::react::ReactAgent;

/// How conversational turns are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    /// One completion over the windowed history, no tools.
    Direct,
    /// The ReAct loop with the tool set.
    ToolAugmented,
}

impl From<ConversationMode> for AgentMode {
    fn from(mode: ConversationMode) -> Self {
        match mode {
            ConversationMode::Direct => AgentMode::Direct,
            ConversationMode::Agent => AgentMode::ToolAugmented,
        }
    }
}

pub struct TutorSession {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    event_bus: Arc<EventBus>,
    catalog: ModelCatalog,
    selection: ModelSelection,
    profile: LearnerProfile,
    memory: ConversationMemory,
    mode: AgentMode,
    tutor: TutorConfig,
    agent_settings: AgentSettings,
    locale: Locale,
    /// Persona for the current profile
    system_prompt: String,
    /// Bound to the current model and persona
    agent: ReactAgent,
}

impl TutorSession {
    /// Start a session from configuration.
    ///
    /// Fails with [`SessionError::MissingCredential`] when no API key is configured.
    pub fn new(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
    ) -> Result<Self, SessionError> {
        if !config.has_api_key() {
            return Err(SessionError::MissingCredential);
        }

        let catalog = config.models.catalog();
        let selection = catalog.select(config.default_tier);
        let profile = config.tutor.profile();
        let locale = Locale::for_language(&profile.native_language);
        let tools = Arc::new(tools);
        let event_bus = Arc::new(EventBus::default());
        let system_prompt = build_system_prompt(&profile);
        let agent = Self::build_agent(
            &provider,
            &tools,
            &event_bus,
            &selection.model_name,
            &system_prompt,
            &config.agent,
            locale,
        );

        info!(
            model = %selection.model_name,
            level = %profile.level,
            tools = tools.len(),
            "Tutor session started"
        );

        Ok(Self {
            provider,
            tools,
            event_bus,
            catalog,
            selection,
            memory: ConversationMemory::new(config.tutor.memory_window),
            mode: config.tutor.mode.into(),
            tutor: config.tutor.clone(),
            agent_settings: config.agent.clone(),
            profile,
            locale,
            system_prompt,
            agent,
        })
    }

    fn build_agent(
        provider: &Arc<dyn Provider>,
        tools: &Arc<ToolRegistry>,
        event_bus: &Arc<EventBus>,
        model: &str,
        system_prompt: &str,
        settings: &AgentSettings,
        locale: Locale,
    ) -> ReactAgent {
        ReactAgent::new(
            provider.clone(),
            model,
            system_prompt,
            tools.clone(),
            event_bus.clone(),
        )
        .with_max_steps(settings.max_steps)
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens)
        .with_llm_timeout(Duration::from_secs(settings.llm_timeout_secs))
        .with_tool_timeout(Duration::from_secs(settings.tool_timeout_secs))
        .with_locale(locale)
    }

    /// Rebuild the cached persona and agent after a profile or model change.
    fn rebuild(&mut self) {
        self.locale = Locale::for_language(&self.profile.native_language);
        self.system_prompt = build_system_prompt(&self.profile);
        self.agent = Self::build_agent(
            &self.provider,
            &self.tools,
            &self.event_bus,
            &self.selection.model_name,
            &self.system_prompt,
            &self.agent_settings,
            self.locale,
        );
    }

    fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_settings.llm_timeout_secs)
    }

    async fn complete(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        let response = tokio::time::timeout(self.llm_timeout(), self.provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "model '{}' did not answer within {}s",
                    self.selection.model_name,
                    self.llm_timeout().as_secs()
                ))
            })??;
        Ok(response.message.content)
    }

    /// Windowed history plus the new message, no tools.
    async fn converse_direct(&mut self, message: &str) -> Result<String, parley_core::Error> {
        let mut messages = vec![Message::system(&self.system_prompt)];
        messages.extend(self.memory.windowed_messages());
        messages.push(Message::user(message));

        let request = ProviderRequest::new(&self.selection.model_name, messages)
            .with_temperature(self.tutor.temperature)
            .with_max_tokens(self.tutor.max_tokens);

        let answer = self.complete(request).await?;
        self.memory.append(Turn::user(message));
        self.memory.append(Turn::assistant(&answer));

        self.event_bus.publish(DomainEvent::TurnCompleted {
            model: self.selection.model_name.clone(),
            think_calls: 1,
            tool_calls: 0,
            timestamp: Utc::now(),
        });
        Ok(answer)
    }

    fn apologize(&self, context: &str, error: &parley_core::Error) -> String {
        warn!(context, error = %error, "Tutor turn failed");
        self.event_bus.publish(DomainEvent::ErrorOccurred {
            context: context.to_string(),
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });
        self.locale.apology(&error.to_string())
    }

    /// Answer one learner message. Never fails: faults become an apology.
    pub async fn converse(&mut self, message: &str) -> String {
        let message = message.trim();
        if message.is_empty() {
            return self.locale.empty_message();
        }

        let result = match self.mode {
            AgentMode::Direct => self.converse_direct(message).await,
            AgentMode::ToolAugmented => self
                .agent
                .run(message, &mut self.memory)
                .await
                .map(|outcome| outcome.answer),
        };

        match result {
            Ok(answer) => answer,
            Err(e) => self.apologize("converse", &e),
        }
    }

    /// Grammar, vocabulary and structure feedback on a piece of text.
    ///
    /// Independent of memory and tools.
    pub async fn analyze_text(&self, text: &str) -> String {
        let request = ProviderRequest::new(
            &self.selection.model_name,
            vec![
                Message::system(ANALYSIS_SYSTEM_PROMPT),
                Message::user(build_analysis_prompt(text, &self.profile.native_language)),
            ],
        )
        .with_temperature(self.tutor.analysis_temperature)
        .with_max_tokens(self.tutor.analysis_max_tokens);

        match self.complete(request).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "Text analysis failed");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "analyze_text".into(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.locale.analysis_failed(&e.to_string())
            }
        }
    }

    /// Change the learner's level. Invalid names leave the profile unchanged.
    pub fn set_level(&mut self, level: &str) -> Result<Level, SessionError> {
        let level: Level = level.parse()?;
        self.profile.level = level;
        self.rebuild();

        info!(%level, "Learner level changed");
        self.event_bus.publish(DomainEvent::LevelChanged {
            level: level.to_string(),
            timestamp: Utc::now(),
        });
        Ok(level)
    }

    /// Switch to another model tier. Unknown tiers leave the selection unchanged.
    pub fn switch_model(&mut self, tier: &str) -> Result<ModelSelection, SessionError> {
        let tier: ModelTier = tier.parse()?;
        self.selection = self.catalog.select(tier);
        self.rebuild();

        info!(%tier, model = %self.selection.model_name, "Model switched");
        self.event_bus.publish(DomainEvent::ModelSwitched {
            tier: tier.to_string(),
            model: self.selection.model_name.clone(),
            timestamp: Utc::now(),
        });
        Ok(self.selection.clone())
    }

    pub fn model_info(&self) -> ModelInfo {
        self.catalog.info(&self.selection)
    }

    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn selection(&self) -> &ModelSelection {
        &self.selection
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AgentMode) {
        self.mode = mode;
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// The persona currently sent with every turn.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Subscribe to session events.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::level_calibration;
    use crate::test_helpers::*;
    use parley_core::message::Role;

    fn config() -> AppConfig {
        AppConfig {
            api_key: Some("gsk-test".into()),
            ..AppConfig::default()
        }
    }

    fn session(provider: Arc<dyn Provider>) -> TutorSession {
        TutorSession::new(&config(), provider, ToolRegistry::new()).unwrap()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = TutorSession::new(
            &AppConfig::default(),
            Arc::new(FailingProvider),
            ToolRegistry::new(),
        );
        assert!(matches!(result, Err(SessionError::MissingCredential)));
    }

    #[test]
    fn blank_api_key_is_fatal() {
        for key in ["", "   "] {
            let config = AppConfig {
                api_key: Some(key.into()),
                ..AppConfig::default()
            };
            let result = TutorSession::new(&config, Arc::new(FailingProvider), ToolRegistry::new());
            assert!(matches!(result, Err(SessionError::MissingCredential)));
        }
    }

    #[test]
    fn starts_with_configured_defaults() {
        let session = session(Arc::new(FailingProvider));
        assert_eq!(session.profile().level, Level::Beginner);
        assert_eq!(session.selection().tier, ModelTier::Balanced);
        assert_eq!(session.selection().model_name, "llama3-70b-8192");
        assert_eq!(session.mode(), AgentMode::ToolAugmented);
        assert_eq!(session.locale(), Locale::Vietnamese);
    }

    #[tokio::test]
    async fn set_level_changes_next_system_prompt() {
        for level in Level::ALL {
            let provider = Arc::new(SequentialMockProvider::texts(&["Great!"]));
            let mut session = session(provider.clone());
            session.set_mode(AgentMode::Direct);

            assert_eq!(session.set_level(level.as_str()).unwrap(), level);
            assert_eq!(session.profile().level, level);

            session.converse("Hello").await;
            let request = &provider.requests()[0];
            assert_eq!(request.messages[0].role, Role::System);
            assert!(request.messages[0].content.contains(level_calibration(level)));
        }
    }

    #[tokio::test]
    async fn set_level_reaches_agent_prompt() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Final Answer: Hi!"]));
        let mut session = session(provider.clone());
        session.set_level("advanced").unwrap();
        session.converse("Hello").await;
        assert!(provider.prompt(0).contains(level_calibration(Level::Advanced)));
    }

    #[test]
    fn invalid_level_is_rejected_without_change() {
        let mut session = session(Arc::new(FailingProvider));
        let before = session.system_prompt().to_string();

        let err = session.set_level("expert").unwrap_err();
        assert_eq!(err, SessionError::InvalidLevel("expert".into()));
        assert_eq!(session.profile().level, Level::Beginner);
        assert_eq!(session.system_prompt(), before);
    }

    #[tokio::test]
    async fn switch_model_rebinds_requests() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Final Answer: Hi!"]));
        let mut session = session(provider.clone());

        let selection = session.switch_model("fast").unwrap();
        assert_eq!(selection.model_name, "llama-3.1-8b-instant");
        session.converse("Hello").await;
        assert_eq!(provider.requests()[0].model, "llama-3.1-8b-instant");

        assert!(matches!(
            session.switch_model("turbo"),
            Err(SessionError::UnknownTier(_))
        ));
        assert_eq!(session.selection().tier, ModelTier::Fast);
        assert_eq!(session.model_info().current.tier, ModelTier::Fast);
    }

    #[tokio::test]
    async fn direct_mode_threads_windowed_history() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Hi Lan!", "Your name is Lan."]));
        let mut session = session(provider.clone());
        session.set_mode(AgentMode::Direct);

        assert_eq!(session.converse("I'm Lan.").await, "Hi Lan!");
        assert_eq!(session.converse("What's my name?").await, "Your name is Lan.");

        let second = &provider.requests()[1];
        let roles: Vec<Role> = second.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert!((second.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(second.max_tokens, Some(500));
        assert_eq!(session.memory().len(), 4);
    }

    #[tokio::test]
    async fn faults_become_apologies_and_session_survives() {
        let mut session = session(Arc::new(FailingProvider));
        let mut events = session.events().subscribe();

        let reply = session.converse("Hello").await;
        assert!(reply.starts_with("Xin lỗi"));
        assert!(session.memory().is_empty());
        assert!(matches!(
            events.recv().await.unwrap().as_ref(),
            DomainEvent::ErrorOccurred { .. }
        ));

        assert!(session.set_level("intermediate").is_ok());
        let reply = session.converse("Still there?").await;
        assert!(reply.starts_with("Xin lỗi"));
    }

    #[tokio::test]
    async fn analyze_text_is_one_shot() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Score: 7/10"]));
        let session = session(provider.clone());

        let analysis = session.analyze_text("I goes to school yesterday").await;
        assert_eq!(analysis, "Score: 7/10");
        assert!(session.memory().is_empty());

        let request = &provider.requests()[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, ANALYSIS_SYSTEM_PROMPT);
        assert!(request.messages[1].content.contains("I goes to school yesterday"));
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, Some(800));
        assert!(request.stop.is_empty());
    }

    #[tokio::test]
    async fn analyze_failure_is_localized() {
        let session = session(Arc::new(FailingProvider));
        let analysis = session.analyze_text("text").await;
        assert!(analysis.starts_with("Không thể phân tích"));
    }

    #[tokio::test]
    async fn empty_message_skips_the_model() {
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let mut session = session(provider.clone());
        let reply = session.converse("   ").await;
        assert_eq!(reply, Locale::Vietnamese.empty_message());
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn model_info_lists_all_tiers() {
        let session = session(Arc::new(FailingProvider));
        let info = session.model_info();
        assert_eq!(info.available.len(), 4);
        assert_eq!(info.current.tier, ModelTier::Balanced);
    }
}
