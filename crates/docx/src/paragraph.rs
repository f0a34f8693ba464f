//! Paragraph-granular replacement for WordprocessingML.
//!
//! A paragraph's text runs are translated as one string and replaced by a
//! single run at the position of the first one. Runs that anchor objects
//! (drawings, fields, note references) stay where they are, and so do the
//! runs inside a field.

use office_core::WalkContext;
use office_ooxml::{local_name, XmlElement, XmlNode};

/// Run children that make a run structural rather than textual.
const OBJECT_MARKERS: &[&str] = &[
    "drawing",
    "pict",
    "object",
    "fldChar",
    "instrText",
    "footnoteReference",
    "endnoteReference",
    "commentReference",
    "sym",
];

/// Children of `w:rPr`, in schema order.
const RUN_PROPERTIES_ORDER: &[&str] = &[
    "rStyle",
    "rFonts",
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
    "rPrChange",
];

/// `w:rFonts` attributes set to the configured font.
const FONT_SLOTS: &[&str] = &["ascii", "hAnsi", "eastAsia", "cs"];

/// How a child of a paragraph or run container is visited.
enum Inline {
    /// `w:hyperlink`: its runs form a unit of their own.
    Link,
    /// Tracked changes, smart tags and custom XML: runs wrapped without a
    /// semantic boundary.
    Wrapper,
    /// `w:sdt`: runs live under `w:sdtContent`.
    Control,
    /// Anything else, `w:fldSimple` included: left as is.
    Other,
}

impl Inline {
    fn of(element: &XmlElement) -> Self {
        match element.local_name() {
            "hyperlink" => Inline::Link,
            "ins" | "moveTo" | "smartTag" | "customXml" => Inline::Wrapper,
            "sdt" => Inline::Control,
            _ => Inline::Other,
        }
    }
}

/// Translate a `w:p`: its direct text runs as one unit, then the runs of
/// each hyperlink, tracked insertion or inline content control, each as a
/// unit of their own.
pub fn translate_paragraph(paragraph: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    translate_inline(paragraph, location, ctx);
}

fn translate_inline(container: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    translate_run_container(container, location, ctx);

    let mut index = 0;
    for child in container.elements_mut() {
        if ctx.is_cancelled() {
            return;
        }
        let (label, inner) = match Inline::of(child) {
            Inline::Link => ("link", Some(child)),
            Inline::Wrapper => ("span", Some(child)),
            Inline::Control => ("control", child.child_mut("sdtContent")),
            Inline::Other => continue,
        };
        index += 1;
        if let Some(inner) = inner {
            let here = format!("{} {} {}", location, label, index);
            translate_inline(inner, &here, ctx);
        }
    }
}

fn translate_run_container(container: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let text = container_text(container);
    if text.trim().is_empty() {
        return;
    }

    let font = ctx.font().to_string();
    ctx.rewrite_with(location, &text, |translated| {
        replace_text_runs(container, translated, &font)
    });
}

/// Text of the direct text runs of `container`.
pub fn container_text(container: &XmlElement) -> String {
    let mask = text_run_mask(container);
    container
        .children
        .iter()
        .zip(mask)
        .filter_map(|(node, is_text)| match node {
            XmlNode::Element(run) if is_text => Some(run_text(run)),
            _ => None,
        })
        .collect()
}

/// For each child node of `container`, whether it is a translatable text run.
///
/// Runs between a field's `begin` and `end` characters hold the field's
/// instruction and its cached result, which Word recomputes, so they are
/// never text runs.
fn text_run_mask(container: &XmlElement) -> Vec<bool> {
    let mut depth = 0usize;
    container
        .children
        .iter()
        .map(|node| {
            let run = match node {
                XmlNode::Element(el) if el.local_name() == "r" => el,
                _ => return false,
            };
            let outside_field = depth == 0;
            for marker in run.children_named("fldChar") {
                match marker.attr_local("fldCharType") {
                    Some("begin") => depth += 1,
                    Some("end") => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            outside_field && depth == 0 && is_text_run(run)
        })
        .collect()
}

fn is_text_run(run: &XmlElement) -> bool {
    !run.elements()
        .any(|child| OBJECT_MARKERS.contains(&child.local_name()))
}

fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.local_name() {
            "t" => text.push_str(&child.text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Remove the text runs of `container` and put one run carrying `text` where
/// the first of them was. The new run keeps the first run's properties.
fn replace_text_runs(container: &mut XmlElement, text: &str, font: &str) {
    let mask = text_run_mask(container);
    let index = match mask.iter().position(|&is_text| is_text) {
        Some(index) => index,
        None => return,
    };

    let (run_name, props) = match &container.children[index] {
        XmlNode::Element(run) => (run.name.clone(), run.child("rPr").cloned()),
        _ => return,
    };

    let mut remove = mask.into_iter();
    container
        .children
        .retain(|_| !remove.next().unwrap_or(false));

    let run = build_run(&run_name, props, text, font);
    container.children.insert(index, XmlNode::Element(run));
}

/// Build a `w:r` carrying `text`; tabs and newlines become `w:tab`/`w:br`.
fn build_run(run_name: &str, props: Option<XmlElement>, text: &str, font: &str) -> XmlElement {
    let mut run = XmlElement::new(run_name);
    let qualified = |local: &str| run.qualify(local);
    let (props_name, t_name, tab_name, br_name) =
        (qualified("rPr"), qualified("t"), qualified("tab"), qualified("br"));

    let mut props = props.unwrap_or_else(|| XmlElement::new(props_name));
    set_run_fonts(&mut props, font);
    run.push_element(props);

    for (line_index, line) in text.split('\n').enumerate() {
        if line_index > 0 {
            run.push_element(XmlElement::new(br_name.as_str()));
        }
        for (piece_index, piece) in line.split('\t').enumerate() {
            if piece_index > 0 {
                run.push_element(XmlElement::new(tab_name.as_str()));
            }
            if !piece.is_empty() {
                let mut t = XmlElement::new(t_name.as_str()).with_attr("xml:space", "preserve");
                t.set_text(piece);
                run.push_element(t);
            }
        }
    }
    run
}

/// Force `font` into every slot of the run's `w:rFonts`.
///
/// Theme font attributes win over explicit names in Word, so they are
/// dropped.
pub fn set_run_fonts(props: &mut XmlElement, font: &str) {
    let fonts_name = props.qualify("rFonts");
    let fonts = props.upsert_child_ordered(&fonts_name, RUN_PROPERTIES_ORDER);
    fonts
        .attributes
        .retain(|(key, _)| !local_name(key).ends_with("Theme"));
    for slot in FONT_SLOTS {
        let key = fonts.qualify(slot);
        fonts.set_attr(&key, font);
    }
}
