//! PPTX (PresentationML) translation backend.
//!
//! Walks slides in deck order and rewrites text in place: shape text runs,
//! table cells, charts, SmartArt diagrams, speaker notes, and the document
//! title and subject.

pub mod chart;
pub mod graphic;
pub mod node;
pub mod text_frame;
pub mod walker;

pub use node::ShapeNode;
pub use walker::PresentationWalker;
