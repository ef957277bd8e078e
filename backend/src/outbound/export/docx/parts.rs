//! Fixed package parts and the parts that vary with the content.

/// Relationship id of the watermark header inside `document.xml.rels`.
pub const HEADER_REL_ID: &str = "rId3";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Escape character data and attribute values.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn content_types(with_header: bool) -> String {
    let header = if with_header {
        r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#
    } else {
        ""
    };
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>{header}</Types>"#
    )
}

pub fn root_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{PACKAGE_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="word/document.xml"/></Relationships>"#
    )
}

pub fn document_rels(with_header: bool) -> String {
    let header = if with_header {
        format!(r#"<Relationship Id="{HEADER_REL_ID}" Type="{REL_NS}/header" Target="header1.xml"/>"#)
    } else {
        String::new()
    };
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{PACKAGE_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/styles" Target="styles.xml"/><Relationship Id="rId2" Type="{REL_NS}/numbering" Target="numbering.xml"/>{header}</Relationships>"#
    )
}

fn heading_style(level: u8, half_points: u32) -> String {
    format!(
        r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{half_points}"/></w:rPr></w:style>"#,
        outline = level - 1,
    )
}

/// Times New Roman 12pt defaults, three heading levels and the two list
/// paragraph styles.
pub fn styles() -> String {
    format!(
        r#"{XML_DECL}
<w:styles xmlns:w="{WORD_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:cs="Times New Roman" w:eastAsia="Times New Roman"/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="360" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>{h1}{h2}{h3}<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:spacing w:after="0"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Header"><w:name w:val="header"/><w:basedOn w:val="Normal"/></w:style></w:styles>"#,
        h1 = heading_style(1, 32),
        h2 = heading_style(2, 28),
        h3 = heading_style(3, 26),
    )
}

/// Bullet definition on `numId` 1 and one restarting decimal instance per
/// ordered list, numbered from 2.
pub fn numbering(ordered_lists: usize) -> String {
    let mut instances = String::from(r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#);
    for offset in 0..ordered_lists {
        instances.push_str(&format!(
            r#"<w:num w:numId="{id}"><w:abstractNumId w:val="1"/><w:lvlOverride w:ilvl="0"><w:startOverride w:val="1"/></w:lvlOverride></w:num>"#,
            id = offset + 2,
        ));
    }
    format!(
        r#"{XML_DECL}
<w:numbering xmlns:w="{WORD_NS}"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>{instances}</w:numbering>"#
    )
}

/// Default header carrying the watermark run.
pub fn watermark_header(text: &str) -> String {
    format!(
        r#"{XML_DECL}
<w:hdr xmlns:w="{WORD_NS}"><w:p><w:pPr><w:pStyle w:val="Header"/><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:color w:val="C0C0C0"/><w:sz w:val="48"/><w:szCs w:val="48"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:hdr>"#,
        escape_xml(text)
    )
}

/// A4 section, one-inch margins, with the watermark header when present.
pub fn section_properties(with_header: bool) -> String {
    let header = if with_header {
        format!(r#"<w:headerReference w:type="default" r:id="{HEADER_REL_ID}"/>"#)
    } else {
        String::new()
    };
    format!(
        r#"<w:sectPr>{header}<w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#
    )
}

pub fn document(body: &str, with_header: bool) -> String {
    format!(
        r#"{XML_DECL}
<w:document xmlns:w="{WORD_NS}" xmlns:r="{REL_NS}"><w:body>{body}{sect}</w:body></w:document>"#,
        sect = section_properties(with_header),
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml(r#"a < b & "c" > d"#), "a &lt; b &amp; &quot;c&quot; &gt; d");
    }

    #[rstest]
    fn header_parts_only_appear_when_watermarked() {
        assert!(content_types(true).contains("/word/header1.xml"));
        assert!(!content_types(false).contains("header"));
        assert!(document_rels(true).contains(HEADER_REL_ID));
        assert!(!section_properties(false).contains("headerReference"));
    }

    #[rstest]
    fn each_ordered_list_gets_its_own_instance() {
        let xml = numbering(2);
        assert!(xml.contains(r#"w:numId="2""#));
        assert!(xml.contains(r#"w:numId="3""#));
        assert!(!xml.contains(r#"w:numId="4""#));
    }
}
