//! Fixture documents and helpers shared by the integration tests.

#![allow(dead_code)]

use office_cli::{Args, FileConfig, Settings};
use office_core::{CompletionRequest, Oracle};
use office_ooxml::testing::zip_parts;
use office_ooxml::Package;
use std::cell::Cell;
use std::path::Path;

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/></Types>"#;

pub const IMAGE_BYTES: &str = "\u{89}PNG fake image bytes";

const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn relationships(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                id, REL, kind, target
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

fn core_properties(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>Tester</dc:creator></cp:coreProperties>"#,
        title
    )
}

/// A `p:sp` text shape whose single paragraph has the given runs.
pub fn text_shape(id: usize, runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| format!(r#"<a:r><a:rPr lang="en-US" sz="2400"/><a:t>{}</a:t></a:r>"#, text))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Title {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p>{}</a:p></p:txBody></p:sp>"#,
        id,
        id - 1,
        runs
    )
}

/// A deck with one slide per entry; each slide holds one text shape whose
/// single paragraph has the given runs.
pub fn pptx(slides: &[&[&str]], title: &str) -> Vec<u8> {
    let trees: Vec<String> = slides.iter().map(|runs| text_shape(2, runs)).collect();
    pptx_with_trees(&trees, title)
}

/// A deck with one slide per entry, each entry being the shapes of that
/// slide's shape tree as raw XML. The `mc` namespace is declared.
pub fn pptx_with_trees(trees: &[String], title: &str) -> Vec<u8> {
    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), CONTENT_TYPES.to_string()),
        (
            "_rels/.rels".to_string(),
            relationships(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        ),
        ("docProps/core.xml".to_string(), core_properties(title)),
        ("ppt/media/image1.png".to_string(), IMAGE_BYTES.to_string()),
    ];

    let mut ids = String::new();
    let mut rels = Vec::new();
    for (index, shapes) in trees.iter().enumerate() {
        let number = index + 1;
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + number, number));
        rels.push((format!("rId{}", number), format!("slides/slide{}.xml", number)));

        let slide = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{}" xmlns:p="{}" xmlns:r="{}" xmlns:mc="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            A, P, R, MC, shapes
        );
        parts.push((format!("ppt/slides/slide{}.xml", number), slide));
    }

    parts.push((
        "ppt/presentation.xml".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="{}" xmlns:r="{}"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            P, R, ids
        ),
    ));
    let rel_items: Vec<(&str, &str, &str)> = rels
        .iter()
        .map(|(id, target)| (id.as_str(), "slide", target.as_str()))
        .collect();
    parts.push(("ppt/_rels/presentation.xml.rels".to_string(), relationships(&rel_items)));

    zip_owned(&parts)
}

/// A Word document with one paragraph per entry, each made of the given runs.
pub fn docx(paragraphs: &[&[&str]], title: &str) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|runs| {
            let runs: String = runs
                .iter()
                .map(|text| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text))
                .collect();
            format!("<w:p>{}</w:p>", runs)
        })
        .collect();
    docx_with_body(&body, title)
}

/// A Word document whose body holds `body` as raw XML, before the section
/// properties.
pub fn docx_with_body(body: &str, title: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
        W, R, body
    );

    zip_owned(&[
        ("[Content_Types].xml".to_string(), CONTENT_TYPES.to_string()),
        (
            "_rels/.rels".to_string(),
            relationships(&[("rId1", "officeDocument", "word/document.xml")]),
        ),
        ("docProps/core.xml".to_string(), core_properties(title)),
        ("word/document.xml".to_string(), document),
    ])
}

fn zip_owned(parts: &[(String, String)]) -> Vec<u8> {
    let borrowed: Vec<(&str, &str)> = parts
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_str()))
        .collect();
    zip_parts(&borrowed)
}

/// Settings for a run in `dir`, caching under `dir/cache`.
pub fn settings(dir: &Path, input: &str, language: &str, use_cache: bool) -> Settings {
    let args = Args {
        input: Some(dir.join(input).to_string_lossy().into_owned()),
        target_language: Some(language.to_string()),
        no_cache: !use_cache,
        cache_dir: Some(dir.join("cache")),
        ..Default::default()
    };
    Settings::resolve(args, FileConfig::default()).unwrap()
}

/// Texts of all `t` elements of a part, in document order.
pub fn texts(package: &Package, part: &str) -> Vec<String> {
    fn collect(element: &office_ooxml::XmlElement, out: &mut Vec<String>) {
        for child in element.elements() {
            if child.local_name() == "t" && child.is_leaf() {
                out.push(child.text());
            } else {
                collect(child, out);
            }
        }
    }
    let mut out = Vec::new();
    collect(&package.read_xml(part).unwrap().root, &mut out);
    out
}

/// Oracle that prefixes its input and trips a cancellation token after a
/// given number of calls, like an operator pressing Ctrl-C mid-run.
pub struct InterruptingOracle {
    pub token: office_core::CancellationToken,
    pub interrupt_after: usize,
    pub calls: Cell<usize>,
}

impl Oracle for InterruptingOracle {
    fn complete(&self, request: &CompletionRequest) -> office_core::Result<String> {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() >= self.interrupt_after {
            self.token.cancel();
        }
        Ok(format!("[zh] {}", request.user))
    }
}
