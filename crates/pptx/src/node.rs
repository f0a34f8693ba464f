//! Classification of shape-tree children.

use office_ooxml::XmlElement;

/// A shape-tree child, decided once when the walker reaches it.
///
/// Each variant borrows the sub-element its handler works on.
#[derive(Debug)]
pub enum ShapeNode<'a> {
    /// `p:sp` (or connector) with a `p:txBody`.
    TextFrame(&'a mut XmlElement),
    /// `a:tbl` inside a graphic frame.
    Table(&'a mut XmlElement),
    /// Chart frame; the relationship id of the chart part.
    Chart(String),
    /// Group shape or markup-compatibility wrapper; walked recursively.
    Group(&'a mut XmlElement),
    /// Any other graphic frame (SmartArt, OLE objects, media).
    Graphic(&'a mut XmlElement),
    /// Pictures, bare connectors, shape-tree properties.
    Inert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    TextFrame,
    Table,
    Chart(String),
    Group,
    Graphic,
    Inert,
}

impl Kind {
    fn of(element: &XmlElement) -> Self {
        match element.local_name() {
            "sp" | "cxnSp" if element.child("txBody").is_some() => Kind::TextFrame,
            "grpSp" | "AlternateContent" | "Choice" | "Fallback" => Kind::Group,
            "graphicFrame" => match element.find(&["graphic", "graphicData"]) {
                Some(data) if data.child("tbl").is_some() => Kind::Table,
                Some(data) => match data.child("chart").and_then(|c| c.prefixed_attr("id")) {
                    Some(id) => Kind::Chart(id.to_string()),
                    None => Kind::Graphic,
                },
                None => Kind::Inert,
            },
            _ => Kind::Inert,
        }
    }
}

impl<'a> ShapeNode<'a> {
    pub fn classify(element: &'a mut XmlElement) -> Self {
        match Kind::of(element) {
            Kind::TextFrame => element
                .child_mut("txBody")
                .map_or(ShapeNode::Inert, ShapeNode::TextFrame),
            Kind::Table => element
                .find_mut(&["graphic", "graphicData", "tbl"])
                .map_or(ShapeNode::Inert, ShapeNode::Table),
            Kind::Chart(id) => ShapeNode::Chart(id),
            Kind::Group => ShapeNode::Group(element),
            Kind::Graphic => ShapeNode::Graphic(element),
            Kind::Inert => ShapeNode::Inert,
        }
    }
}

/// Display name of a shape for locations: its `cNvPr@name`, or the element
/// name when it has none.
pub fn shape_name(shape: &XmlElement) -> String {
    shape
        .elements()
        .find(|el| el.local_name().starts_with("nv"))
        .and_then(|nv| nv.child("cNvPr"))
        .and_then(|props| props.attr("name"))
        .map(|name| format!("'{}'", name))
        .unwrap_or_else(|| shape.local_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use office_ooxml::XmlDocument;

    fn element(xml: &str) -> XmlElement {
        XmlDocument::parse(xml).unwrap().root
    }

    #[test]
    fn test_classify_shapes() {
        let mut sp = element(
            r#"<p:sp xmlns:p="p" xmlns:a="a"><p:nvSpPr><p:cNvPr id="2" name="Title 1"/></p:nvSpPr><p:txBody><a:p/></p:txBody></p:sp>"#,
        );
        assert_eq!(shape_name(&sp), "'Title 1'");
        assert!(matches!(ShapeNode::classify(&mut sp), ShapeNode::TextFrame(body) if body.local_name() == "txBody"));

        let mut empty_sp = element(r#"<p:sp xmlns:p="p"><p:spPr/></p:sp>"#);
        assert!(matches!(ShapeNode::classify(&mut empty_sp), ShapeNode::Inert));

        let mut pic = element(r#"<p:pic xmlns:p="p"/>"#);
        assert_eq!(shape_name(&pic), "pic");
        assert!(matches!(ShapeNode::classify(&mut pic), ShapeNode::Inert));

        let mut group = element(r#"<mc:AlternateContent xmlns:mc="mc"><mc:Choice/></mc:AlternateContent>"#);
        assert!(matches!(ShapeNode::classify(&mut group), ShapeNode::Group(_)));
    }

    #[test]
    fn test_classify_graphic_frames() {
        let mut table = element(
            r#"<p:graphicFrame xmlns:p="p" xmlns:a="a"><a:graphic><a:graphicData><a:tbl><a:tr/></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        assert!(matches!(ShapeNode::classify(&mut table), ShapeNode::Table(tbl) if tbl.local_name() == "tbl"));

        let mut chart = element(
            r#"<p:graphicFrame xmlns:p="p" xmlns:a="a" xmlns:c="c" xmlns:r="r"><a:graphic><a:graphicData><c:chart r:id="rId3"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        assert!(matches!(ShapeNode::classify(&mut chart), ShapeNode::Chart(id) if id == "rId3"));

        let mut diagram = element(
            r#"<p:graphicFrame xmlns:p="p" xmlns:a="a" xmlns:dgm="d" xmlns:r="r"><a:graphic><a:graphicData><dgm:relIds r:dm="rId4"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        assert!(matches!(ShapeNode::classify(&mut diagram), ShapeNode::Graphic(_)));
    }
}
