//! Domain types shared by the document walkers and the pipeline driver.

use crate::error::{Error, Result};

/// The format of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PresentationML (.pptx).
    Pptx,
    /// WordprocessingML (.docx).
    Docx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    ///
    /// Legacy extensions map to their modern counterpart; whether the file
    /// really is a zip package is decided later by [`DocumentFormat::check_magic`].
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" | "ppt" => Some(Self::Pptx),
            "docx" | "doc" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Extensions accepted when auto-discovering input files of this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Pptx => &["pptx", "ppt"],
            Self::Docx => &["docx", "doc"],
        }
    }

    /// Human readable label used in log output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pptx => "PPT",
            Self::Docx => "Word",
        }
    }

    /// Verify the file header is an OOXML (zip) package.
    pub fn check_magic(bytes: &[u8]) -> Result<()> {
        // PK\x03\x04
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Ok(());
        }

        // OLE/CFB (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
            return Err(Error::UnsupportedFormat(
                "legacy binary Office file; save it as .pptx or .docx first".to_string(),
            ));
        }

        Err(Error::UnsupportedFormat(
            "file is not an Office Open XML package".to_string(),
        ))
    }
}

/// What happened to a single translatable unit (run, paragraph, or leaf).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// New text was written back.
    Translated,
    /// Nothing to do: blank, trivial, or identical translation.
    Unchanged,
    /// The unit was left unmodified for the given reason.
    Failed(String),
}

/// A unit that could not be translated, with where it lives in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub location: String,
    pub reason: String,
}

/// Outcomes collected over one walk of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub translated: usize,
    pub unchanged: usize,
    pub failures: Vec<UnitFailure>,
    /// The walk stopped early because of an interrupt.
    pub cancelled: bool,
}

impl WalkReport {
    /// Record the outcome of one unit.
    pub fn record(&mut self, location: &str, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Translated => self.translated += 1,
            UnitOutcome::Unchanged => self.unchanged += 1,
            UnitOutcome::Failed(reason) => {
                log::warn!("Skipping {}: {}", location, reason);
                self.failures.push(UnitFailure {
                    location: location.to_string(),
                    reason,
                });
            }
        }
    }

    /// Total number of units visited.
    pub fn visited(&self) -> usize {
        self.translated + self.unchanged + self.failures.len()
    }
}
