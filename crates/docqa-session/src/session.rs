//! Conversation session: owns the corpus, cache and history, and runs queries.

use std::sync::Arc;

use tracing::{debug, info, warn};

use docqa_core::{
    Answer, DocQaConfig, DocQaError, Generator, ResponseMode, Result, WebResult,
    WebSearchProvider, WebStatus,
};
use docqa_query::{web, ContextAssembler, IndexedCorpus, QueryEngine};

use crate::cache::{cache_key, CachePolicy, ResponseCache};
use crate::history::ChatHistory;
use crate::prompt::{answer_prompt, parse_questions, questions_prompt, summary_prompt};

/// Chunks fed to question suggestion and summaries.
const INSIGHT_CHUNKS: usize = 20;

/// One user's conversation with the document assistant.
///
/// Queries run one at a time. The corpus and its indexes are replaced as a
/// unit, and every change that could make a cached answer stale clears the
/// whole cache.
pub struct Session {
    config: DocQaConfig,
    engine: QueryEngine,
    assembler: ContextAssembler,
    generator: Arc<dyn Generator>,
    web: Option<Arc<dyn WebSearchProvider>>,
    corpus: Option<IndexedCorpus>,
    cache: ResponseCache<Answer>,
    history: ChatHistory,
    mode: ResponseMode,
    suggested_questions: Vec<String>,
}

/// Borrowed view of everything needed to answer one uncached query.
struct Pipeline<'a> {
    config: &'a DocQaConfig,
    engine: &'a QueryEngine,
    assembler: &'a ContextAssembler,
    generator: &'a dyn Generator,
    web: Option<&'a dyn WebSearchProvider>,
    corpus: Option<&'a IndexedCorpus>,
    mode: ResponseMode,
}

impl Pipeline<'_> {
    async fn run(&self, query: &str, history: &str) -> Result<Answer> {
        let retrieval = self.engine.retrieve(self.corpus, query).await;
        let (web_result, web_status) = self.web_search(query).await;

        let bundle = self
            .assembler
            .assemble(&retrieval.chunks(), web_result.as_ref());

        let instruction = &self.config.modes.for_mode(self.mode).instruction;
        let prompt = answer_prompt(instruction, history, &bundle, query);
        debug!("Prompt assembled ({} chars)", prompt.len());

        let params = self.config.generation_params(self.mode);
        let generated = self.generator.generate(&prompt, &params).await?;

        let page_citations = if bundle.has_document_context() {
            bundle.page_citations.clone()
        } else {
            Vec::new()
        };

        Ok(Answer {
            text: format!("{}{}", generated, bundle.citation_suffix()),
            page_citations,
            web: web_status,
            cached: false,
        })
    }

    async fn web_search(&self, query: &str) -> (Option<WebResult>, WebStatus) {
        if !self.config.web.enabled || !web::should_trigger(query) {
            return (None, WebStatus::NotTriggered);
        }

        let Some(provider) = self.web else {
            debug!("Web search triggered but no provider is configured");
            return (None, WebStatus::Unavailable);
        };

        info!("Searching the web with {}", provider.name());
        let result = web::adapt(provider.search(query).await);
        let status = if result.success {
            WebStatus::Used
        } else {
            WebStatus::Failed(result.error.clone().unwrap_or_default())
        };
        (Some(result), status)
    }
}

impl Session {
    /// Create a session without a corpus.
    pub fn new(
        config: DocQaConfig,
        generator: Arc<dyn Generator>,
        web: Option<Arc<dyn WebSearchProvider>>,
    ) -> Self {
        Self {
            engine: QueryEngine::new(&config.search),
            assembler: ContextAssembler::new(&config.search),
            cache: ResponseCache::new(CachePolicy::from(&config.cache)),
            history: ChatHistory::new(&config.history),
            generator,
            web,
            corpus: None,
            mode: ResponseMode::default(),
            suggested_questions: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &DocQaConfig {
        &self.config
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn corpus(&self) -> Option<&IndexedCorpus> {
        self.corpus.as_ref()
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn cached_responses(&self) -> usize {
        self.cache.len()
    }

    pub fn suggested_questions(&self) -> &[String] {
        &self.suggested_questions
    }

    /// Replace the corpus and its indexes.
    pub fn load_corpus(&mut self, corpus: IndexedCorpus) {
        info!("Loading corpus with {} chunks", corpus.len());
        self.corpus = Some(corpus);
        self.suggested_questions.clear();
        self.cache.clear();
    }

    /// Drop the corpus; later queries run without document context.
    pub fn reset_corpus(&mut self) {
        info!("Resetting knowledge base");
        self.corpus = None;
        self.suggested_questions.clear();
        self.cache.clear();
    }

    /// Switch response mode. Changing the mode clears the cache.
    pub fn set_mode(&mut self, mode: ResponseMode) {
        if mode != self.mode {
            info!("Response mode changed to {}", mode);
            self.mode = mode;
            self.cache.clear();
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.cache.clear();
    }

    /// Answer a question and record the exchange in the history.
    ///
    /// Cache hits skip retrieval, web search and generation entirely. A
    /// generation failure is recorded in the history as an error message,
    /// is not cached, and is returned to the caller.
    pub async fn ask(&mut self, query: &str) -> Result<Answer> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DocQaError::invalid_argument("Please enter a valid question"));
        }

        let key = cache_key(query, self.mode);
        let history = self.history.format_for_prompt();

        let pipeline = Pipeline {
            config: &self.config,
            engine: &self.engine,
            assembler: &self.assembler,
            generator: self.generator.as_ref(),
            web: self.web.as_deref(),
            corpus: self.corpus.as_ref(),
            mode: self.mode,
        };

        let mut computed = false;
        let result = self
            .cache
            .get_or_compute(&key, || {
                computed = true;
                pipeline.run(query, &history)
            })
            .await;

        self.history.push_user(query);

        match result {
            Ok(mut answer) => {
                answer.cached = !computed;
                if answer.cached {
                    debug!("Answered from cache");
                }
                self.history.push_assistant(answer.text.clone());
                Ok(answer)
            }
            Err(e) => {
                warn!("Failed to answer query: {}", e);
                self.history
                    .push_assistant(format!("Error generating response: {}", e));
                Err(e)
            }
        }
    }

    /// Generate and remember questions about the loaded document.
    pub async fn suggest_questions(&mut self, count: usize) -> Result<Vec<String>> {
        let document = self.insight_document()?;
        let params = self.config.generation_params(ResponseMode::Detailed);

        let response = self
            .generator
            .generate(&questions_prompt(&document, count), &params)
            .await?;

        self.suggested_questions = parse_questions(&response, count);
        Ok(self.suggested_questions.clone())
    }

    /// Summarize the loaded document.
    pub async fn summarize(&self) -> Result<String> {
        let document = self.insight_document()?;
        let params = self.config.generation_params(ResponseMode::Detailed);

        self.generator
            .generate(&summary_prompt(&document), &params)
            .await
    }

    fn insight_document(&self) -> Result<String> {
        let corpus = self
            .corpus
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DocQaError::invalid_argument("No document loaded"))?;

        Ok(corpus
            .chunks()
            .iter()
            .take(INSIGHT_CHUNKS)
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
