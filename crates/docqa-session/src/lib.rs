//! docqa-session - Conversational document Q&A
//!
//! This crate wires retrieval, web augmentation and generation into a
//! per-user session that remembers recent turns and caches answers.
//!
//! # Operations
//!
//! - `ask` - Answer a question with document and web citations
//! - `set_mode` - Switch between concise and detailed answers
//! - `load_corpus` / `reset_corpus` - Replace or drop the knowledge base
//! - `suggest_questions` - Propose questions about the loaded document
//! - `summarize` - Summarize the loaded document

mod cache;
mod history;
mod prompt;
mod session;

pub use cache::{cache_key, CachePolicy, ResponseCache};
pub use history::{strip_citations, ChatHistory, ChatMessage, Role};
pub use prompt::{answer_prompt, parse_questions};
pub use session::Session;
