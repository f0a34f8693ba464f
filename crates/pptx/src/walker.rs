//! Presentation walker: slides in deck order, their shape trees, notes,
//! and document properties.

use crate::chart::translate_chart_part;
use crate::graphic::translate_graphic;
use crate::node::{shape_name, ShapeNode};
use crate::text_frame::{translate_table, translate_text_frame};
use office_core::{Error, Result, UnitOutcome, WalkContext};
use office_ooxml::rels::types;
use office_ooxml::{translate_core_properties, Package, Relationships, XmlElement};

/// Main part used when the package relationships do not name one.
pub const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Walks a PresentationML package and translates it in place.
pub struct PresentationWalker;

impl PresentationWalker {
    pub fn new() -> Self {
        Self
    }

    /// Translate every slide, its notes, and the document properties.
    ///
    /// Only a missing or unreadable presentation part is fatal; everything
    /// below it is recorded per unit in the walk report.
    pub fn translate(&self, package: &mut Package, ctx: &mut WalkContext<'_>) -> Result<()> {
        let presentation = self.main_part(package)?;
        let slides = self.slide_order(package, &presentation)?;
        log::info!("Found {} slides", slides.len());

        for (idx, slide_path) in slides.iter().enumerate() {
            if ctx.is_cancelled() {
                log::info!("Interrupted before slide {}", idx + 1);
                return Ok(());
            }
            log::info!("Translating slide {}/{}", idx + 1, slides.len());
            self.translate_slide(package, slide_path, idx + 1, ctx);
        }

        if !ctx.is_cancelled() {
            translate_core_properties(package, ctx);
        }
        Ok(())
    }

    /// The presentation part named by the package relationships.
    fn main_part(&self, package: &Package) -> Result<String> {
        let rels = Relationships::for_package(package)?;
        if let Some(rel) = rels.of_type(types::OFFICE_DOCUMENT).next() {
            return Ok(rel.target.clone());
        }
        if package.contains(DEFAULT_PRESENTATION_PART) {
            return Ok(DEFAULT_PRESENTATION_PART.to_string());
        }
        Err(Error::MissingPart(DEFAULT_PRESENTATION_PART.to_string()))
    }

    /// Slide part names in deck order.
    ///
    /// The order comes from `p:sldIdLst`; packages without one fall back to
    /// the slide relationships sorted by the number in their id or target.
    fn slide_order(&self, package: &Package, presentation: &str) -> Result<Vec<String>> {
        let rels = Relationships::for_part(package, presentation)?;
        let doc = package.read_xml(presentation)?;

        let listed: Vec<String> = doc
            .root
            .child("sldIdLst")
            .map(|list| {
                list.children_named("sldId")
                    .filter_map(|sld| sld.prefixed_attr("id"))
                    .filter_map(|id| rels.get(id))
                    .map(|rel| rel.target.clone())
                    .collect()
            })
            .unwrap_or_default();
        if !listed.is_empty() {
            return Ok(listed);
        }

        let mut slides: Vec<(String, Option<usize>)> = rels
            .of_type(types::SLIDE)
            .map(|rel| {
                let order_num =
                    extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.target));
                (rel.target.clone(), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn translate_slide(
        &self,
        package: &mut Package,
        slide_path: &str,
        number: usize,
        ctx: &mut WalkContext<'_>,
    ) {
        let location = format!("slide {}", number);
        let rels = translate_shape_part(package, slide_path, &location, ctx);

        for notes in rels.of_type(types::NOTES_SLIDE) {
            if ctx.is_cancelled() {
                return;
            }
            let here = format!("{} notes", location);
            translate_shape_part(package, &notes.target, &here, ctx);
        }
    }
}

impl Default for PresentationWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate the shape tree of a slide-like part (slide or notes page) and
/// return the part's relationships.
fn translate_shape_part(
    package: &mut Package,
    part: &str,
    location: &str,
    ctx: &mut WalkContext<'_>,
) -> Relationships {
    let rels = match Relationships::for_part(package, part) {
        Ok(rels) => rels,
        Err(e) => {
            log::warn!("Ignoring relationships of {}: {}", part, e);
            Relationships::default()
        }
    };

    let mut doc = match package.take_xml(part) {
        Ok(doc) => doc,
        Err(e) => {
            ctx.record(location, UnitOutcome::Failed(e.to_string()));
            return rels;
        }
    };

    match doc.root.find_mut(&["cSld", "spTree"]) {
        Some(tree) => walk_shape_tree(tree, package, &rels, location, ctx),
        None => log::debug!("{} has no shape tree", part),
    }
    package.store_xml(part, doc);
    rels
}

/// Visit the children of a shape tree or group in document order.
fn walk_shape_tree(
    tree: &mut XmlElement,
    package: &mut Package,
    rels: &Relationships,
    location: &str,
    ctx: &mut WalkContext<'_>,
) {
    for shape in tree.elements_mut() {
        if ctx.is_cancelled() {
            return;
        }
        let here = format!("{} {}", location, shape_name(shape));
        match ShapeNode::classify(shape) {
            ShapeNode::TextFrame(body) => translate_text_frame(body, &here, ctx),
            ShapeNode::Table(table) => translate_table(table, &here, ctx),
            ShapeNode::Chart(rel_id) => translate_chart_part(package, rels, &rel_id, &here, ctx),
            ShapeNode::Group(group) => walk_shape_tree(group, package, rels, &here, ctx),
            ShapeNode::Graphic(frame) => translate_graphic(frame, package, rels, &here, ctx),
            ShapeNode::Inert => {}
        }
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
