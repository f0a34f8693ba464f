//! The single `translate(text) -> text` entry point used by every walker.

use crate::cache::TranslationCache;
use crate::oracle::{CompletionRequest, Oracle};
use crate::prompt::PromptBuilder;
use std::ops::{Deref, DerefMut};

/// Inputs shorter than this (after trimming) are never sent anywhere.
pub const MIN_TRANSLATABLE_CHARS: usize = 2;

/// Settings that stay fixed for one run.
#[derive(Debug, Clone)]
pub struct TranslatorSettings {
    pub target_language: String,
    pub temperature: f32,
    /// Font forced onto every rewritten run.
    pub font: String,
    pub prompt: PromptBuilder,
}

/// Where a translation came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Empty or too short; returned unchanged.
    Skipped,
    Cache,
    Oracle,
    /// The oracle failed; the original text was returned.
    Fallback(String),
}

/// Result of translating one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub provenance: Provenance,
}

impl Translation {
    /// True when the text came from the cache or the oracle.
    pub fn is_fresh(&self) -> bool {
        matches!(self.provenance, Provenance::Cache | Provenance::Oracle)
    }
}

/// Cache-augmented translator for a single target language.
pub struct Translator {
    oracle: Box<dyn Oracle>,
    cache: TranslationCache,
    settings: TranslatorSettings,
    instruction: String,
    oracle_calls: usize,
}

impl Translator {
    pub fn new(oracle: Box<dyn Oracle>, cache: TranslationCache, settings: TranslatorSettings) -> Self {
        let instruction = settings.prompt.build(&settings.target_language);
        Self {
            oracle,
            cache,
            settings,
            instruction,
            oracle_calls: 0,
        }
    }

    /// Translate `text`, degrading to the original on any failure.
    pub fn translate(&mut self, text: &str) -> String {
        self.translate_detailed(text).text
    }

    /// Translate `text` and report where the result came from.
    pub fn translate_detailed(&mut self, text: &str) -> Translation {
        if text.trim().chars().count() < MIN_TRANSLATABLE_CHARS {
            return Translation {
                text: text.to_string(),
                provenance: Provenance::Skipped,
            };
        }

        if let Some(cached) = self.cache.get(text) {
            return Translation {
                text: cached,
                provenance: Provenance::Cache,
            };
        }

        let request = CompletionRequest {
            system: self.instruction.clone(),
            user: text.to_string(),
            temperature: self.settings.temperature,
        };

        self.oracle_calls += 1;
        match self.oracle.complete(&request) {
            Ok(response) => {
                let translated = response.trim().to_string();
                log::debug!("Translated: {:?} -> {:?}", text, translated);
                self.cache.put(text, &translated);
                Translation {
                    text: translated,
                    provenance: Provenance::Oracle,
                }
            }
            Err(e) => {
                log::warn!("Translation error: {}", e);
                Translation {
                    text: text.to_string(),
                    provenance: Provenance::Fallback(e.to_string()),
                }
            }
        }
    }

    pub fn font(&self) -> &str {
        &self.settings.font
    }

    pub fn target_language(&self) -> &str {
        &self.settings.target_language
    }

    /// The system instruction sent with every request.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }
}

/// Owns a [`Translator`] and flushes its cache when dropped.
///
/// Dropping happens on every exit path of the driver (completion,
/// cancellation, error, unwinding), so resolved translations always reach
/// disk. Flush errors are logged, never raised.
pub struct CacheGuard {
    translator: Translator,
}

impl CacheGuard {
    pub fn new(translator: Translator) -> Self {
        Self { translator }
    }
}

impl Deref for CacheGuard {
    type Target = Translator;

    fn deref(&self) -> &Translator {
        &self.translator
    }
}

impl DerefMut for CacheGuard {
    fn deref_mut(&mut self) -> &mut Translator {
        &mut self.translator
    }
}

impl Drop for CacheGuard {
    fn drop(&mut self) {
        if let Err(e) = self.translator.cache.flush() {
            log::error!("Failed to save cache: {}", e);
        }
    }
}
