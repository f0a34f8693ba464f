//! Office Open XML package layer for document translation.
//!
//! Reads .pptx/.docx files (ZIP archives of XML parts) into editable
//! element trees and writes them back with untouched parts preserved.

pub mod leaf;
pub mod package;
pub mod props;
pub mod rels;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod xml;

pub use leaf::translate_leaf;
pub use package::Package;
pub use props::{translate_core_properties, CORE_PROPERTIES_PART};
pub use rels::{resolve_target, Relationship, Relationships};
pub use xml::{local_name, XmlDocument, XmlElement, XmlNode};
