//! Memory for Parley: the per-session conversation window and the
//! passage indexes backing document retrieval.

pub mod chunker;
pub mod keyword;
pub mod vector;
pub mod window;

pub use chunker::chunk_text;
pub use keyword::KeywordIndex;
pub use vector::{cosine_similarity, EmbeddingIndex};
pub use window::ConversationMemory;
