//! Generic graphic frames, including SmartArt diagrams.
//!
//! Any element named `t` without element children is treated as a text
//! leaf and translated as a whole string, wherever it sits.

use office_core::{UnitOutcome, WalkContext};
use office_ooxml::{translate_leaf, Package, Relationships, XmlElement};

/// Translate the text leaves of a graphic frame and of any diagram parts it
/// links to.
pub fn translate_graphic(
    frame: &mut XmlElement,
    package: &mut Package,
    rels: &Relationships,
    location: &str,
    ctx: &mut WalkContext<'_>,
) {
    translate_text_leaves(frame, location, ctx);

    let data_ids: Vec<String> = frame
        .find(&["graphic", "graphicData"])
        .map(|data| {
            data.children_named("relIds")
                .filter_map(|ids| ids.prefixed_attr("dm"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    for id in data_ids {
        if ctx.is_cancelled() {
            return;
        }
        let data_part = match rels.get(&id) {
            Some(rel) => rel.target.clone(),
            None => {
                ctx.record(
                    location,
                    UnitOutcome::Failed(format!("diagram relationship '{}' not found", id)),
                );
                continue;
            }
        };

        let drawing_id = translate_diagram_part(package, &data_part, location, ctx);

        // The pre-rendered drawing is linked from the data part's extension
        // list, but its relationship lives on the slide.
        if let Some(drawing) = drawing_id.as_deref().and_then(|id| rels.get(id)) {
            let drawing_part = drawing.target.clone();
            translate_diagram_part(package, &drawing_part, location, ctx);
        }
    }
}

/// Translate every text leaf of a diagram part. Returns the drawing
/// relationship id declared by a data part, if any.
fn translate_diagram_part(
    package: &mut Package,
    part: &str,
    location: &str,
    ctx: &mut WalkContext<'_>,
) -> Option<String> {
    let mut doc = match package.take_xml(part) {
        Ok(doc) => doc,
        Err(e) => {
            ctx.record(location, UnitOutcome::Failed(e.to_string()));
            return None;
        }
    };

    log::debug!("Translating diagram part {}", part);
    let drawing_id = doc
        .root
        .find_descendant("dataModelExt")
        .and_then(|ext| ext.attr("relId"))
        .map(str::to_string);

    let here = format!("{} ({})", location, part);
    translate_text_leaves(&mut doc.root, &here, ctx);
    package.store_xml(part, doc);
    drawing_id
}

/// Translate every non-blank `t` leaf under `element`.
pub fn translate_text_leaves(element: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let mut index = 0;
    visit_leaves(element, location, &mut index, ctx);
}

fn visit_leaves(
    element: &mut XmlElement,
    location: &str,
    index: &mut usize,
    ctx: &mut WalkContext<'_>,
) {
    for child in element.elements_mut() {
        if ctx.is_cancelled() {
            return;
        }
        let is_text_leaf = child.local_name() == "t" && child.is_leaf();

        if !is_text_leaf {
            visit_leaves(child, location, index, ctx);
        } else if !child.text().trim().is_empty() {
            *index += 1;
            translate_leaf(child, &format!("{} text {}", location, index), ctx);
        }
    }
}
