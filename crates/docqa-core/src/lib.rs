//! docqa-core - Core types and traits for the document Q&A engine
//!
//! This crate provides the foundational types, collaborator traits, error
//! handling and configuration used throughout the docqa workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{DocQaError, Result};
pub use traits::*;
pub use types::*;
