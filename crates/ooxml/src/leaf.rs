//! Whole-string translation of single text-leaf elements.

use crate::xml::XmlElement;
use office_core::{UnitOutcome, WalkContext};

/// Translate the character data of `element` as one string and write the
/// result back into the same element.
///
/// Blank leaves are recorded as unchanged without consulting the translator.
pub fn translate_leaf(element: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let text = element.text();
    if text.trim().is_empty() {
        ctx.record(location, UnitOutcome::Unchanged);
        return;
    }
    ctx.translate_with(location, &text, |translated| element.set_text(translated));
}
