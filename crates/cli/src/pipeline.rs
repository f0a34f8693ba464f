//! The translation run: open, walk, save, with the cache flushed on every
//! exit path.

use crate::discover::Job;
use crate::settings::Settings;
use anyhow::{Context, Result};
use office_core::{
    CacheGuard, CancellationToken, DocumentFormat, Oracle, TranslationCache, Translator,
    TranslatorSettings, WalkContext, WalkReport,
};
use office_docx::WordWalker;
use office_ooxml::Package;
use office_pptx::PresentationWalker;
use std::path::PathBuf;

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// The translated document was written to `output`.
    Completed {
        output: PathBuf,
        report: WalkReport,
        cache_hits: usize,
        oracle_calls: usize,
    },
    /// Interrupted; nothing was written.
    Cancelled {
        report: WalkReport,
        cache_hits: usize,
    },
}

/// Build the translator for a run: the persisted cache (or a disabled one)
/// plus the given oracle.
pub fn build_translator(settings: &Settings, oracle: Box<dyn Oracle>) -> Translator {
    let cache = if settings.use_cache {
        TranslationCache::load(&settings.cache_dir, &settings.target_language)
    } else {
        log::info!("Translation cache disabled");
        TranslationCache::disabled()
    };

    Translator::new(
        oracle,
        cache,
        TranslatorSettings {
            target_language: settings.target_language.clone(),
            temperature: settings.temperature,
            font: settings.font.clone(),
            prompt: settings.prompt.clone(),
        },
    )
}

/// Translate `job.input` into `job.output`.
///
/// The cache is flushed when this returns, whatever the outcome. A
/// cancelled walk leaves the output path untouched.
pub fn run(job: &Job, translator: Translator, cancel: &CancellationToken) -> Result<Outcome> {
    let mut translator = CacheGuard::new(translator);

    let mut package = Package::open(&job.input)
        .with_context(|| format!("Failed to open {}", job.input.display()))?;

    let report = {
        let mut ctx = WalkContext::new(&mut translator, cancel);
        let walked = match job.format {
            DocumentFormat::Pptx => PresentationWalker::new().translate(&mut package, &mut ctx),
            DocumentFormat::Docx => WordWalker::new().translate(&mut package, &mut ctx),
        };
        walked.with_context(|| format!("Failed to translate {}", job.input.display()))?;
        ctx.finish()
    };

    let cache_hits = translator.cache().hits();
    if report.cancelled {
        log::warn!("Interrupted; {} not written", job.output.display());
        return Ok(Outcome::Cancelled { report, cache_hits });
    }

    package
        .save(&job.output)
        .with_context(|| format!("Failed to save {}", job.output.display()))?;
    log::info!("Translated {} file saved to {}", job.format.label(), job.output.display());

    Ok(Outcome::Completed {
        output: job.output.clone(),
        report,
        cache_hits,
        oracle_calls: translator.oracle_calls(),
    })
}
