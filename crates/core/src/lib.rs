//! Core domain types, translation cache, and translation oracle
//! for office document translation.

pub mod cache;
pub mod error;
pub mod oracle;
pub mod prompt;
pub mod translator;
pub mod types;
pub mod walk;

pub use cache::TranslationCache;
pub use error::{Error, Result};
pub use oracle::{ChatCompletionOracle, CompletionRequest, MockMode, MockOracle, Oracle, OracleConfig};
pub use prompt::PromptBuilder;
pub use translator::{CacheGuard, Provenance, Translation, Translator, TranslatorSettings};
pub use types::{DocumentFormat, UnitFailure, UnitOutcome, WalkReport};
pub use walk::{CancellationToken, WalkContext};
