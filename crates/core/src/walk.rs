//! Shared state threaded through a document walk.

use crate::translator::{Provenance, Translation, Translator};
use crate::types::{UnitOutcome, WalkReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, set from a signal handler and polled by
/// the walkers between units.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Translator, cancellation token, and report for one walk.
pub struct WalkContext<'a> {
    translator: &'a mut Translator,
    cancel: &'a CancellationToken,
    report: WalkReport,
}

impl<'a> WalkContext<'a> {
    pub fn new(translator: &'a mut Translator, cancel: &'a CancellationToken) -> Self {
        Self {
            translator,
            cancel,
            report: WalkReport::default(),
        }
    }

    /// Walkers stop visiting units once this returns true.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn translate(&mut self, text: &str) -> Translation {
        self.translator.translate_detailed(text)
    }

    /// Font forced onto rewritten runs.
    pub fn font(&self) -> &str {
        self.translator.font()
    }

    pub fn record(&mut self, location: &str, outcome: UnitOutcome) {
        self.report.record(location, outcome);
    }

    /// Translate a standalone string and write it back through `apply`.
    ///
    /// `apply` only runs for fresh translations that differ from the source;
    /// oracle fallbacks are recorded as failures and leave the unit untouched.
    pub fn translate_with<F>(&mut self, location: &str, text: &str, apply: F)
    where
        F: FnOnce(&str),
    {
        let outcome = match self.translate(text) {
            Translation {
                provenance: Provenance::Fallback(reason),
                ..
            } => UnitOutcome::Failed(format!("translation failed: {}", reason)),
            t if t.is_fresh() && t.text != text => {
                apply(&t.text);
                UnitOutcome::Translated
            }
            _ => UnitOutcome::Unchanged,
        };
        self.record(location, outcome);
    }

    /// Translate the text of a run or run container and rewrite it through
    /// `apply`, even when the text comes back unchanged.
    ///
    /// Rewriting is what forces the configured font, so every unit that did
    /// not fail is rewritten. Oracle fallbacks are recorded as failures and
    /// leave the unit untouched.
    pub fn rewrite_with<F>(&mut self, location: &str, text: &str, apply: F)
    where
        F: FnOnce(&str),
    {
        let outcome = match self.translate(text) {
            Translation {
                provenance: Provenance::Fallback(reason),
                ..
            } => UnitOutcome::Failed(format!("translation failed: {}", reason)),
            t => {
                let changed = t.text != text;
                apply(&t.text);
                if changed {
                    UnitOutcome::Translated
                } else {
                    UnitOutcome::Unchanged
                }
            }
        };
        self.record(location, outcome);
    }

    /// Finish the walk and return its report.
    pub fn finish(self) -> WalkReport {
        let mut report = self.report;
        report.cancelled = self.cancel.is_cancelled();
        report
    }
}
