//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley English tutor.
//! This crate has **no framework dependencies**: it defines the domain model
//! that every other crate implements against.
//!
//! Each external collaborator (language model, passage retrieval, knowledge
//! lookup) is a trait here; implementations live in their own crates so they
//! can be swapped out or replaced with scripted stubs in tests.

pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod profile;
pub mod provider;
pub mod retrieval;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role, Turn, TurnRole};
pub use model::{ModelCatalog, ModelInfo, ModelSelection, ModelTier};
pub use profile::{LearnerProfile, Level};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retrieval::{KnowledgeOutcome, KnowledgeSource, Passage, PassageRetriever};
pub use tool::{Tool, ToolRegistry};
