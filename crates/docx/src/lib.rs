//! DOCX (WordprocessingML) translation backend.
//!
//! Paragraphs are translated whole so sentences keep their context; the
//! text runs of each paragraph collapse into one run in the configured font.

pub mod paragraph;
pub mod walker;

pub use walker::WordWalker;
