//! Command-line driver for office document translation.
//!
//! Resolves settings and the input file, then runs the translation pipeline
//! for the detected document format.

pub mod discover;
pub mod pipeline;
pub mod settings;

pub use discover::{derive_output_path, resolve_job, Job};
pub use pipeline::{build_translator, run, Outcome};
pub use settings::{Args, FileConfig, FileType, Settings};
