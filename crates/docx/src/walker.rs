//! Word document walker: body, tables, content controls, headers and
//! footers, and document properties.

use crate::paragraph::translate_paragraph;
use office_core::{Error, Result, UnitOutcome, WalkContext};
use office_ooxml::rels::types;
use office_ooxml::{translate_core_properties, Package, Relationships, XmlElement};

/// Main part used when the package relationships do not name one.
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// Block-level content, decided once per body child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Paragraph,
    Table,
    /// `w:sdt`; its `w:sdtContent` holds more blocks.
    ContentControl,
    /// Transparent wrappers whose children are blocks.
    Wrapper,
    Other,
}

impl Block {
    fn of(element: &XmlElement) -> Self {
        match element.local_name() {
            "p" => Block::Paragraph,
            "tbl" => Block::Table,
            "sdt" => Block::ContentControl,
            "customXml" | "ins" | "moveTo" => Block::Wrapper,
            _ => Block::Other,
        }
    }
}

/// Walks a WordprocessingML package and translates it in place.
pub struct WordWalker;

impl WordWalker {
    pub fn new() -> Self {
        Self
    }

    /// Translate the body, every header and footer part, and the document
    /// properties.
    ///
    /// A missing or unreadable main document part is fatal; everything
    /// else is recorded per unit.
    pub fn translate(&self, package: &mut Package, ctx: &mut WalkContext<'_>) -> Result<()> {
        let main = self.main_part(package)?;
        let rels = match Relationships::for_part(package, &main) {
            Ok(rels) => rels,
            Err(e) => {
                log::warn!("Ignoring relationships of {}: {}", main, e);
                Relationships::default()
            }
        };

        let mut doc = package.take_xml(&main)?;
        let body = doc
            .root
            .child_mut("body")
            .ok_or_else(|| Error::XmlError(format!("'{}' has no document body", main)))?;

        log::info!("Translating document body");
        walk_blocks(body, "body", ctx);

        let sections = section_parts(&doc.root, &rels);
        package.store_xml(&main, doc);

        for (kind, part) in sections {
            if ctx.is_cancelled() {
                return Ok(());
            }
            log::info!("Translating {} {}", kind, part);
            translate_section(package, &part, &format!("{} ({})", kind, part), ctx);
        }

        if !ctx.is_cancelled() {
            translate_core_properties(package, ctx);
        }
        Ok(())
    }

    fn main_part(&self, package: &Package) -> Result<String> {
        let rels = Relationships::for_package(package)?;
        if let Some(rel) = rels.of_type(types::OFFICE_DOCUMENT).next() {
            return Ok(rel.target.clone());
        }
        if package.contains(DEFAULT_DOCUMENT_PART) {
            return Ok(DEFAULT_DOCUMENT_PART.to_string());
        }
        Err(Error::MissingPart(DEFAULT_DOCUMENT_PART.to_string()))
    }
}

impl Default for WordWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Header and footer parts referenced by any section, each listed once, in
/// order of first reference.
fn section_parts(root: &XmlElement, rels: &Relationships) -> Vec<(&'static str, String)> {
    let mut references = Vec::new();
    collect_references(root, &mut references);

    let mut parts: Vec<(&'static str, String)> = Vec::new();
    for (kind, id) in references {
        let rel = match rels.get(&id) {
            Some(rel) => rel,
            None => {
                log::warn!("Section references unknown relationship '{}'", id);
                continue;
            }
        };
        let expected = if kind == "header" { types::HEADER } else { types::FOOTER };
        if !rel.is_type(expected) {
            log::warn!("Relationship '{}' is not a {}", id, kind);
            continue;
        }
        if !parts.iter().any(|(_, part)| *part == rel.target) {
            parts.push((kind, rel.target.clone()));
        }
    }
    parts
}

fn collect_references(element: &XmlElement, out: &mut Vec<(&'static str, String)>) {
    for child in element.elements() {
        let kind = match child.local_name() {
            "headerReference" => Some("header"),
            "footerReference" => Some("footer"),
            _ => None,
        };
        match kind {
            Some(kind) => {
                if let Some(id) = child.prefixed_attr("id") {
                    out.push((kind, id.to_string()));
                }
            }
            None => collect_references(child, out),
        }
    }
}

fn translate_section(package: &mut Package, part: &str, location: &str, ctx: &mut WalkContext<'_>) {
    let mut doc = match package.take_xml(part) {
        Ok(doc) => doc,
        Err(e) => {
            ctx.record(location, UnitOutcome::Failed(e.to_string()));
            return;
        }
    };
    walk_blocks(&mut doc.root, location, ctx);
    package.store_xml(part, doc);
}

/// Visit block-level children (paragraphs, tables, content controls) in
/// document order.
fn walk_blocks(container: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    let mut paragraphs = 0;
    let mut tables = 0;

    for block in container.elements_mut() {
        if ctx.is_cancelled() {
            return;
        }
        match Block::of(block) {
            Block::Paragraph => {
                paragraphs += 1;
                let here = format!("{} paragraph {}", location, paragraphs);
                translate_paragraph(block, &here, ctx);
            }
            Block::Table => {
                tables += 1;
                let here = format!("{} table {}", location, tables);
                translate_table(block, &here, ctx);
            }
            Block::ContentControl => {
                if let Some(content) = block.child_mut("sdtContent") {
                    walk_blocks(content, location, ctx);
                }
            }
            Block::Wrapper => walk_blocks(block, location, ctx),
            Block::Other => {}
        }
    }
}

/// Every row, every cell; cells hold blocks, so nested tables recurse.
fn translate_table(table: &mut XmlElement, location: &str, ctx: &mut WalkContext<'_>) {
    for (row_index, row) in table.children_named_mut("tr").enumerate() {
        for (col_index, cell) in row.children_named_mut("tc").enumerate() {
            if ctx.is_cancelled() {
                return;
            }
            let here = format!("{} cell {},{}", location, row_index + 1, col_index + 1);
            walk_blocks(cell, &here, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paragraph::container_text;
    use office_core::{
        CancellationToken, MockMode, MockOracle, PromptBuilder, TranslationCache, Translator,
        TranslatorSettings,
    };
    use office_ooxml::testing::package_with;
    use std::rc::Rc;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/><Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/></Relationships>"#;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn p(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn section(tag: &str, text: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{tag} xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:{tag}>"#,
            p(text),
            tag = tag
        )
    }

    fn translator(oracle: &Rc<MockOracle>) -> Translator {
        Translator::new(
            Box::new(Rc::clone(oracle)),
            TranslationCache::in_memory(),
            TranslatorSettings {
                target_language: "zh-CN".to_string(),
                temperature: 0.7,
                font: "Microsoft YaHei".to_string(),
                prompt: PromptBuilder::new(),
            },
        )
    }

    fn prefixing() -> Rc<MockOracle> {
        Rc::new(MockOracle::new(MockMode::Prefix("译:".to_string())))
    }

    fn paragraph_texts(package: &Package, part: &str) -> Vec<String> {
        fn collect(element: &XmlElement, out: &mut Vec<String>) {
            for child in element.elements() {
                if child.local_name() == "p" {
                    out.push(container_text(child));
                } else {
                    collect(child, out);
                }
            }
        }
        let mut out = Vec::new();
        collect(&package.read_xml(part).unwrap().root, &mut out);
        out
    }

    #[test]
    fn test_body_tables_and_content_controls_in_order() {
        let body = format!(
            r#"{}<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr/>{}</w:tc><w:tc><w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}</w:tc></w:tr></w:tbl><w:sdt><w:sdtPr/><w:sdtContent>{}</w:sdtContent></w:sdt><w:p/><w:sectPr/>"#,
            p("Introduction"),
            p("Cell"),
            p("Nested"),
            p(""),
            p("Controlled")
        );
        let mut package = package_with(&[
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", document(&body).as_str()),
        ]);
        let oracle = prefixing();
        let mut t = translator(&oracle);
        let cancel = CancellationToken::new();
        let mut ctx = WalkContext::new(&mut t, &cancel);

        WordWalker::new().translate(&mut package, &mut ctx).unwrap();
        let report = ctx.finish();
        assert_eq!(report.translated, 4);
        assert!(report.failures.is_empty());
        assert_eq!(oracle.payloads(), ["Introduction", "Cell", "Nested", "Controlled"]);
        assert_eq!(
            paragraph_texts(&package, "word/document.xml"),
            ["译:Introduction", "译:Cell", "译:Nested", "", "译:Controlled", ""]
        );
    }

    #[test]
    fn test_headers_and_footers_are_visited_once() {
        let body = format!(
            r#"{}<w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId7"/><w:footerReference w:type="default" r:id="rId8"/></w:sectPr></w:pPr></w:p>{}<w:sectPr><w:headerReference w:type="default" r:id="rId7"/><w:footerReference w:type="first" r:id="rId8"/></w:sectPr>"#,
            p("Chapter one"),
            p("Chapter two")
        );
        let mut package = package_with(&[
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", document(&body).as_str()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/header1.xml", section("hdr", "Confidential").as_str()),
            ("word/footer1.xml", section("ftr", "Page footer").as_str()),
        ]);
        let oracle = prefixing();
        let mut t = translator(&oracle);
        let cancel = CancellationToken::new();
        let mut ctx = WalkContext::new(&mut t, &cancel);

        WordWalker::new().translate(&mut package, &mut ctx).unwrap();
        let report = ctx.finish();
        assert_eq!(report.translated, 4);
        assert_eq!(
            oracle.payloads(),
            ["Chapter one", "Chapter two", "Confidential", "Page footer"]
        );
        assert_eq!(paragraph_texts(&package, "word/header1.xml"), ["译:Confidential"]);
        assert_eq!(paragraph_texts(&package, "word/footer1.xml"), ["译:Page footer"]);
    }

    #[test]
    fn test_missing_header_part_is_a_unit_failure() {
        let body = format!(
            r#"{}<w:sectPr><w:headerReference w:type="default" r:id="rId7"/></w:sectPr>"#,
            p("Body text")
        );
        let mut package = package_with(&[
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", document(&body).as_str()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ]);
        let oracle = prefixing();
        let mut t = translator(&oracle);
        let cancel = CancellationToken::new();
        let mut ctx = WalkContext::new(&mut t, &cancel);

        WordWalker::new().translate(&mut package, &mut ctx).unwrap();
        let report = ctx.finish();
        assert_eq!(report.translated, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].location.contains("word/header1.xml"));
    }

    #[test]
    fn test_missing_document_is_fatal() {
        let mut package = package_with(&[("[Content_Types].xml", "<Types/>")]);
        let oracle = prefixing();
        let mut t = translator(&oracle);
        let cancel = CancellationToken::new();
        let mut ctx = WalkContext::new(&mut t, &cancel);

        let result = WordWalker::new().translate(&mut package, &mut ctx);
        assert!(matches!(result, Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_cancel_stops_before_next_paragraph() {
        let mut package = package_with(&[(
            "word/document.xml",
            document(&format!("{}{}", p("First"), p("Second"))).as_str(),
        )]);
        let oracle = prefixing();
        let mut t = translator(&oracle);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut ctx = WalkContext::new(&mut t, &cancel);

        WordWalker::new().translate(&mut package, &mut ctx).unwrap();
        assert!(ctx.finish().cancelled);
        assert_eq!(oracle.calls(), 0);
    }
}
