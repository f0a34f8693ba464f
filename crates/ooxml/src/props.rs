//! Document metadata in `docProps/core.xml`.

use crate::leaf::translate_leaf;
use crate::package::Package;
use office_core::{UnitOutcome, WalkContext};

pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Core properties translated as standalone strings.
const TRANSLATED_FIELDS: &[&str] = &["title", "subject"];

/// Translate the document title and subject, if present.
///
/// A missing or unreadable properties part is not an error: metadata is
/// best-effort and never blocks the document itself.
pub fn translate_core_properties(package: &mut Package, ctx: &mut WalkContext<'_>) {
    if !package.contains(CORE_PROPERTIES_PART) {
        return;
    }

    let mut doc = match package.take_xml(CORE_PROPERTIES_PART) {
        Ok(doc) => doc,
        Err(e) => {
            ctx.record("document properties", UnitOutcome::Failed(e.to_string()));
            return;
        }
    };

    for field in TRANSLATED_FIELDS {
        if ctx.is_cancelled() {
            break;
        }
        if let Some(element) = doc.root.child_mut(field) {
            translate_leaf(element, &format!("document {}", field), ctx);
        }
    }

    package.store_xml(CORE_PROPERTIES_PART, doc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use office_core::{
        CancellationToken, MockMode, MockOracle, PromptBuilder, TranslationCache, Translator,
        TranslatorSettings,
    };

    const CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Annual Review</dc:title><dc:subject>Finance</dc:subject><dc:creator>Ops Team</dc:creator></cp:coreProperties>"#;

    fn translator() -> Translator {
        Translator::new(
            Box::new(MockOracle::new(MockMode::Prefix("译:".to_string()))),
            TranslationCache::in_memory(),
            TranslatorSettings {
                target_language: "zh-CN".to_string(),
                temperature: 0.7,
                font: "Microsoft YaHei".to_string(),
                prompt: PromptBuilder::new(),
            },
        )
    }

    #[test]
    fn test_title_and_subject_are_translated() {
        let mut package = crate::testing::package_with(&[(CORE_PROPERTIES_PART, CORE)]);
        let mut translator = translator();
        let cancel = CancellationToken::new();
        let mut ctx = WalkContext::new(&mut translator, &cancel);

        translate_core_properties(&mut package, &mut ctx);
        let report = ctx.finish();
        assert_eq!(report.translated, 2);

        let doc: XmlDocument = package.read_xml(CORE_PROPERTIES_PART).unwrap();
        assert_eq!(doc.root.child("title").unwrap().text(), "译:Annual Review");
        assert_eq!(doc.root.child("subject").unwrap().text(), "译:Finance");
        assert_eq!(doc.root.child("creator").unwrap().text(), "Ops Team");
    }
}
