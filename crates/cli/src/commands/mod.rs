//! Subcommands and the session wiring they share.

pub mod analyze;
pub mod chat;
pub mod init;
pub mod models;

use parley_agent::TutorSession;
use parley_config::{AppConfig, RetrieverKind};
use parley_core::provider::Provider;
use parley_core::retrieval::{Passage, PassageRetriever};
use parley_memory::{chunk_text, EmbeddingIndex, KeywordIndex};
use parley_tools::{default_registry, ToolLimits, WikipediaSource};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

/// Load and validate configuration.
pub fn load_config() -> Result<AppConfig, Box<dyn Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate()?;
    Ok(config)
}

fn print_missing_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    PARLEY_API_KEY   (generic)");
    eprintln!("    GROQ_API_KEY     (Groq, the default provider)");
    eprintln!("    OPENAI_API_KEY   (OpenAI direct)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}

/// Read a corpus file, or every `.txt`/`.md` file in a directory.
///
/// Returns `(source name, text)` pairs in file-name order.
pub fn read_corpus(path: &Path) -> std::io::Result<Vec<(String, String)>> {
    let name = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| p.display().to_string())
    };

    if path.is_file() {
        return Ok(vec![(name(path), std::fs::read_to_string(path)?)]);
    }

    let mut files: Vec<_> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext == "txt" || ext == "md")
        })
        .collect();
    files.sort();

    files
        .into_iter()
        .map(|p| Ok((name(&p), std::fs::read_to_string(&p)?)))
        .collect()
}

/// Build the passage retriever for document retrieval.
///
/// Without a configured corpus the index is empty and every query reports
/// no relevant passages.
pub async fn load_retriever(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> Result<Arc<dyn PassageRetriever>, Box<dyn Error>> {
    let knowledge = &config.knowledge;
    let documents = match &knowledge.corpus_path {
        Some(path) => read_corpus(Path::new(path))
            .map_err(|e| format!("Failed to read corpus {path}: {e}"))?,
        None => Vec::new(),
    };

    match knowledge.retriever {
        RetrieverKind::Keyword => {
            let mut index = KeywordIndex::new();
            for (source, text) in &documents {
                index.add_document(
                    Some(source),
                    text,
                    knowledge.chunk_size,
                    knowledge.chunk_overlap,
                );
            }
            tracing::info!(chunks = index.len(), "Keyword index ready");
            Ok(Arc::new(index))
        }
        RetrieverKind::Embedding => {
            let model = knowledge
                .embedding_model
                .clone()
                .ok_or("knowledge.embedding_model is not set")?;
            let passages = documents
                .iter()
                .flat_map(|(source, text)| {
                    chunk_text(text, knowledge.chunk_size, knowledge.chunk_overlap)
                        .into_iter()
                        .map(|content| Passage {
                            content,
                            source: Some(source.clone()),
                            score: 0.0,
                        })
                })
                .collect();
            let index = EmbeddingIndex::build(provider, model, passages).await?;
            Ok(Arc::new(index))
        }
    }
}

/// Wire provider, retriever, tools and session together.
pub async fn build_session(config: &AppConfig) -> Result<TutorSession, Box<dyn Error>> {
    if !config.has_api_key() {
        print_missing_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider: Arc<dyn Provider> = Arc::new(parley_providers::build_from_config(config)?);
    let retriever = load_retriever(config, provider.clone()).await?;
    let knowledge = Arc::new(WikipediaSource::new(
        &config.knowledge.wiki_language,
        config.knowledge.max_candidates,
    )?);
    let limits = ToolLimits {
        top_k: config.knowledge.top_k,
        summary_chars: config.knowledge.summary_chars,
        max_candidates: config.knowledge.max_candidates,
    };
    let tools = default_registry(retriever, knowledge, config.clock.offset()?, limits)?;

    Ok(TutorSession::new(config, provider, tools)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_single_file_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grammar.txt");
        std::fs::write(&path, "The present perfect links past and present.").unwrap();

        let docs = read_corpus(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "grammar.txt");
    }

    #[test]
    fn reads_text_files_from_directory_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "Phrasal verbs").unwrap();
        std::fs::write(dir.path().join("a.txt"), "Articles").unwrap();
        std::fs::write(dir.path().join("c.json"), "{}").unwrap();

        let docs = read_corpus(dir.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.md"]);
    }

    #[test]
    fn missing_corpus_is_an_error() {
        assert!(read_corpus(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[tokio::test]
    async fn keyword_retriever_indexes_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Use the present perfect for experiences.").unwrap();

        let mut config = AppConfig::default();
        config.knowledge.corpus_path = Some(path.display().to_string());

        struct Unused;
        #[async_trait::async_trait]
        impl Provider for Unused {
            fn name(&self) -> &str {
                "unused"
            }
            async fn complete(
                &self,
                _request: parley_core::provider::ProviderRequest,
            ) -> Result<parley_core::provider::ProviderResponse, parley_core::error::ProviderError>
            {
                unreachable!("keyword indexing never calls the model")
            }
        }

        let retriever = load_retriever(&config, Arc::new(Unused)).await.unwrap();
        assert_eq!(retriever.name(), "keyword");
        let hits = retriever.nearest("present perfect", 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source.as_deref(), Some("notes.txt"));
    }
}
