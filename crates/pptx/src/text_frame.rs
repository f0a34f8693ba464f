//! DrawingML text bodies: shapes, table cells, and chart titles.

use office_core::{UnitOutcome, WalkContext};
use office_ooxml::{XmlElement, XmlNode};

/// Children of `a:r`, in schema order.
const RUN_ORDER: &[&str] = &["rPr", "t"];

/// Children of `a:rPr`, in schema order.
const RUN_PROPERTIES_ORDER: &[&str] = &[
    "ln",
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
    "effectLst",
    "effectDag",
    "highlight",
    "uLnTx",
    "uLn",
    "uFillTx",
    "uFill",
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// Translate every run of a text body (`p:txBody`, `a:txBody`, `c:rich`)
/// on its own. Run properties other than the typeface are left alone.
pub fn translate_text_frame(body: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    for (p_index, paragraph) in body.children_named_mut("p").enumerate() {
        for (r_index, run) in paragraph.children_named_mut("r").enumerate() {
            if ctx.is_cancelled() {
                return;
            }
            let here = format!("{} p{} r{}", location, p_index + 1, r_index + 1);
            translate_run(run, &here, ctx);
        }
    }
}

fn translate_run(run: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let text = match run.child("t") {
        Some(t) => t.text(),
        None => {
            ctx.record(location, UnitOutcome::Unchanged);
            return;
        }
    };
    if text.is_empty() {
        ctx.record(location, UnitOutcome::Unchanged);
        return;
    }

    let font = ctx.font().to_string();
    ctx.rewrite_with(location, &text, |translated| {
        if let Some(t) = run.child_mut("t") {
            t.set_text(translated);
        }
        set_run_font(run, &font);
    });
}

/// Translate a table: every cell's text body, row by row.
pub fn translate_table(table: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    for (row_index, row) in table.children_named_mut("tr").enumerate() {
        for (col_index, cell) in row.children_named_mut("tc").enumerate() {
            if ctx.is_cancelled() {
                return;
            }
            if let Some(body) = cell.child_mut("txBody") {
                let here = format!("{} cell {},{}", location, row_index + 1, col_index + 1);
                translate_text_frame(body, &here, ctx);
            }
        }
    }
}

/// Translate each paragraph of a text body as one string, line breaks
/// included, rebuilding it from the first run's formatting. Used where run
/// boundaries carry no meaning (chart titles).
pub fn translate_paragraphs_whole(body: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    for (index, paragraph) in body.children_named_mut("p").enumerate() {
        if ctx.is_cancelled() {
            return;
        }
        let here = format!("{} p{}", location, index + 1);
        translate_paragraph_whole(paragraph, &here, ctx);
    }
}

fn translate_paragraph_whole(paragraph: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let mut text = String::new();
    for child in paragraph.elements() {
        match child.local_name() {
            "r" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text());
                }
            }
            "br" => text.push('\n'),
            _ => {}
        }
    }
    if text.trim().is_empty() {
        ctx.record(location, UnitOutcome::Unchanged);
        return;
    }

    let font = ctx.font().to_string();
    ctx.rewrite_with(location, &text, |translated| {
        collapse_runs(paragraph, translated, &font)
    });
}

/// Replace the runs and line breaks of a paragraph with one run per line of
/// `text`, separated by `a:br`. Every new run copies the first run's
/// formatting.
fn collapse_runs(paragraph: &mut XmlElement, text: &str, font: &str) {
    let is_line_content =
        |node: &XmlNode| matches!(node, XmlNode::Element(el) if matches!(el.local_name(), "r" | "br"));

    let template = match paragraph.child("r") {
        Some(run) => run.clone(),
        None => return,
    };
    let index = match paragraph.children.iter().position(is_line_content) {
        Some(index) => index,
        None => return,
    };
    paragraph.children.retain(|node| !is_line_content(node));

    let t_name = template.qualify("t");
    let br_name = template.qualify("br");
    let mut lines = Vec::new();
    for (line_index, line) in text.split('\n').enumerate() {
        if line_index > 0 {
            lines.push(XmlNode::Element(XmlElement::new(br_name.as_str())));
        }
        let mut run = template.clone();
        run.upsert_child_ordered(&t_name, RUN_ORDER).set_text(line);
        set_run_font(&mut run, font);
        lines.push(XmlNode::Element(run));
    }
    paragraph.children.splice(index..index, lines);
}

/// Force `font` as the latin and east-asian typeface of a run, creating
/// `a:rPr`, `a:latin`, and `a:ea` in schema order when missing.
pub fn set_run_font(run: &mut XmlElement, font: &str) {
    let props_name = run.qualify("rPr");
    let props = run.upsert_child_ordered(&props_name, RUN_ORDER);
    for face in ["latin", "ea"] {
        let name = props.qualify(face);
        props
            .upsert_child_ordered(&name, RUN_PROPERTIES_ORDER)
            .set_attr("typeface", font);
    }
}
