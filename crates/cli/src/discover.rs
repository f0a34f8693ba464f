//! Input resolution and output path derivation.

use crate::settings::Settings;
use office_core::{DocumentFormat, Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A resolved unit of work: what to read, how to read it, where to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: DocumentFormat,
}

/// Resolve the input file, its format, and the output path.
///
/// Relative inputs and auto-discovery are resolved against `dir`.
pub fn resolve_job(settings: &Settings, dir: &Path) -> Result<Job> {
    let input = match &settings.input {
        Some(path) => {
            let path = dir.join(path);
            if !path.is_file() {
                return Err(Error::InvalidInput(format!("File not found: {}", path.display())));
            }
            log::info!("Using specified input file: {}", path.display());
            path
        }
        None => {
            let format = settings
                .file_type
                .map(|t| t.format())
                .unwrap_or(DocumentFormat::Pptx);
            let path = discover_input(dir, format)?;
            log::info!("Auto-selected input file: {}", path.display());
            path
        }
    };

    let format = match settings.file_type {
        Some(file_type) => file_type.format(),
        None => format_from_path(&input)?,
    };

    DocumentFormat::check_magic(&read_header(&input)?)?;

    let output = derive_output_path(&input, &settings.target_language);
    Ok(Job {
        input,
        output,
        format,
    })
}

/// First file in `dir` (by name) with one of `format`'s extensions.
pub fn discover_input(dir: &Path, format: DocumentFormat) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| has_extension(path, format.extensions()))
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| {
        let wanted: Vec<String> = format.extensions().iter().map(|e| format!(".{}", e)).collect();
        Error::InvalidInput(format!(
            "No {} files found in {}",
            wanted.join(" or "),
            dir.display()
        ))
    })
}

/// `<dir>/<stem>-<language>.<ext>` next to the input.
pub fn derive_output_path(input: &Path, target_language: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, target_language, ext),
        None => format!("{}-{}", stem, target_language),
    };

    match input.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

fn format_from_path(path: &Path) -> Result<DocumentFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    DocumentFormat::from_extension(ext).ok_or_else(|| {
        Error::UnsupportedFormat(format!("Unsupported file type: '{}'", path.display()))
    })
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|want| e.eq_ignore_ascii_case(want)))
        .unwrap_or(false)
}

/// First bytes of the file, for format sniffing.
fn read_header(path: &Path) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(8);
    File::open(path)?.take(8).read_to_end(&mut header)?;
    Ok(header)
}
