//! Chart parts (`c:chartSpace`): titles, series names, and categories.
//!
//! Cached string values are translated in place as whole strings; numeric
//! caches and formulas are never touched.

use crate::text_frame::translate_paragraphs_whole;
use office_core::{UnitOutcome, WalkContext};
use office_ooxml::{translate_leaf, Package, Relationships, XmlElement};

/// Subtrees holding numbers, formulas, or formats rather than text.
const NON_TEXT_VALUES: &[&str] = &["numRef", "numCache", "numLit", "f", "formatCode"];

/// Translate the chart part a graphic frame points at through `rel_id`.
pub fn translate_chart_part(
    package: &mut Package,
    rels: &Relationships,
    rel_id: &str,
    location: &str,
    ctx: &mut WalkContext<'_>,
) {
    let part = match rels.get(rel_id) {
        Some(rel) => rel.target.clone(),
        None => {
            ctx.record(
                location,
                UnitOutcome::Failed(format!("chart relationship '{}' not found", rel_id)),
            );
            return;
        }
    };

    let mut doc = match package.take_xml(&part) {
        Ok(doc) => doc,
        Err(e) => {
            ctx.record(location, UnitOutcome::Failed(e.to_string()));
            return;
        }
    };

    log::debug!("Translating chart {}", part);
    translate_chart(&mut doc.root, location, ctx);
    package.store_xml(&part, doc);
}

/// Translate a parsed `c:chartSpace`.
pub fn translate_chart(space: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let chart = match space.child_mut("chart") {
        Some(chart) => chart,
        None => {
            ctx.record(
                location,
                UnitOutcome::Failed("chart part has no chart element".to_string()),
            );
            return;
        }
    };

    if let Some(title) = chart.child_mut("title") {
        translate_title(title, &format!("{} title", location), ctx);
    }

    let plot = match chart.child_mut("plotArea") {
        Some(plot) => plot,
        None => return,
    };

    let mut axis = 0;
    for group in plot.elements_mut() {
        if ctx.is_cancelled() {
            return;
        }
        let is_chart_group = group.local_name().ends_with("Chart");
        let is_axis = group.local_name().ends_with("Ax");

        if is_chart_group {
            for (index, series) in group.children_named_mut("ser").enumerate() {
                let here = format!("{} series {}", location, index + 1);
                if let Some(tx) = series.child_mut("tx") {
                    translate_string_values(tx, &format!("{} name", here), ctx);
                }
                if let Some(cat) = series.child_mut("cat") {
                    translate_string_values(cat, &format!("{} category", here), ctx);
                }
            }
        } else if is_axis {
            axis += 1;
            if let Some(title) = group.child_mut("title") {
                translate_title(title, &format!("{} axis {} title", location, axis), ctx);
            }
        }
    }
}

/// Rich titles collapse per paragraph; referenced titles use their cache.
fn translate_title(title: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let tx = match title.child_mut("tx") {
        Some(tx) => tx,
        None => return,
    };
    match tx.child_mut("rich") {
        Some(rich) => translate_paragraphs_whole(rich, location, ctx),
        None => translate_string_values(tx, location, ctx),
    }
}

fn translate_string_values(element: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let mut index = 0;
    visit_values(element, location, &mut index, ctx);
}

fn visit_values(
    element: &mut XmlElement,
    location: &str,
    index: &mut usize,
    ctx: &mut WalkContext<'_>,
) {
    for child in element.elements_mut() {
        if ctx.is_cancelled() {
            return;
        }
        let skip = NON_TEXT_VALUES.contains(&child.local_name());
        let is_value = child.local_name() == "v";

        if skip {
            continue;
        } else if is_value {
            *index += 1;
            translate_leaf(child, &format!("{} {}", location, index), ctx);
        } else {
            visit_values(child, location, index, ctx);
        }
    }
}
