//! Part relationships (`_rels/*.rels`).

use crate::package::Package;
use office_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Relationship type suffixes used by the walkers.
pub mod types {
    pub const OFFICE_DOCUMENT: &str = "/officeDocument";
    pub const SLIDE: &str = "/slide";
    pub const NOTES_SLIDE: &str = "/notesSlide";
    pub const CHART: &str = "/chart";
    pub const DIAGRAM_DATA: &str = "/diagramData";
    pub const DIAGRAM_DRAWING: &str = "/diagramDrawing";
    pub const HEADER: &str = "/header";
    pub const FOOTER: &str = "/footer";
}

/// A single relationship with its target resolved to a package part name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Part name inside the package (no leading slash), or the raw target
    /// for external relationships.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with `suffix` (e.g. `"/chart"`).
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Relationships declared by one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Location of the rels part for `part`:
    /// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`,
    /// and the package root (`""`) → `_rels/.rels`.
    pub fn rels_path(part: &str) -> String {
        match part.rfind('/') {
            Some(pos) => format!("{}/_rels/{}.rels", &part[..pos], &part[pos + 1..]),
            None => format!("_rels/{}.rels", part),
        }
    }

    /// Relationships of `part`; a part without a rels file has none.
    pub fn for_part(package: &Package, part: &str) -> Result<Self> {
        let rels_path = Self::rels_path(part);
        if !package.contains(&rels_path) {
            return Ok(Self::default());
        }
        let content = package.read_string(&rels_path)?;
        Self::parse(&content, part)
    }

    /// Relationships of the package itself (`_rels/.rels`).
    pub fn for_package(package: &Package) -> Result<Self> {
        Self::for_part(package, "")
    }

    /// Parse rels XML declared by `source_part`.
    pub fn parse(xml: &str, source_part: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if crate::xml::local_name(&String::from_utf8_lossy(e.name().as_ref()))
                        == "Relationship" =>
                {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"TargetMode" => external = value == "External",
                            _ => {}
                        }
                    }

                    if id.is_empty() || target.is_empty() {
                        continue;
                    }
                    let target = if external {
                        target
                    } else {
                        resolve_target(source_part, &target)
                    };
                    items.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships of '{}': {}",
                        source_part, e
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { items })
    }

    /// Internal relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id && !r.external)
    }

    /// Internal relationships of a given type, in declaration order.
    pub fn of_type<'a>(&'a self, suffix: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.items
            .iter()
            .filter(move |r| !r.external && r.is_type(suffix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Resolve a relationship target against the directory of `source_part`.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rfind('/') {
        Some(pos) => source_part[..pos].split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
