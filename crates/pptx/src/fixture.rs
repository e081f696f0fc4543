//! Builds small but structurally complete PPTX packages for tests.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug, Clone, Default)]
struct FixtureSlide {
    title: String,
    image: Option<String>,
    notes: bool,
    link_to: Option<usize>,
}

/// Builder for a test presentation.
#[derive(Debug, Clone)]
pub struct PptxFixture {
    slides: Vec<FixtureSlide>,
    masters: Vec<Vec<String>>,
    sections: bool,
    custom_show: bool,
    reversed_ids: bool,
    main_content_type: String,
}

impl PptxFixture {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            masters: Vec::new(),
            sections: false,
            custom_show: false,
            reversed_ids: false,
            main_content_type: CT_PRESENTATION.to_string(),
        }
    }

    pub fn slide(self, title: &str) -> Self {
        self.push(FixtureSlide {
            title: title.to_string(),
            ..Default::default()
        })
    }

    pub fn slide_with_image(self, title: &str, media: &str) -> Self {
        self.push(FixtureSlide {
            title: title.to_string(),
            image: Some(media.to_string()),
            ..Default::default()
        })
    }

    pub fn slide_with_notes(self, title: &str) -> Self {
        self.push(FixtureSlide {
            title: title.to_string(),
            notes: true,
            ..Default::default()
        })
    }

    /// A slide with a hyperlink jumping to the slide at 0-based `target`.
    pub fn slide_linking_to(self, title: &str, target: usize) -> Self {
        self.push(FixtureSlide {
            title: title.to_string(),
            link_to: Some(target),
            ..Default::default()
        })
    }

    /// Add a master with the given layout names. Without any call, one
    /// master with "Title Slide" and "Title and Content" is used.
    pub fn master(mut self, layouts: &[&str]) -> Self {
        self.masters
            .push(layouts.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_sections(mut self) -> Self {
        self.sections = true;
        self
    }

    pub fn with_custom_show(mut self) -> Self {
        self.custom_show = true;
        self
    }

    /// Number slide relationship ids against slide order.
    pub fn reversed_relationship_ids(mut self) -> Self {
        self.reversed_ids = true;
        self
    }

    pub fn main_content_type(mut self, content_type: &str) -> Self {
        self.main_content_type = content_type.to_string();
        self
    }

    fn push(mut self, slide: FixtureSlide) -> Self {
        self.slides.push(slide);
        self
    }

    fn slide_rel_id(&self, index: usize) -> String {
        if self.reversed_ids {
            format!("rId{}", 100 + self.slides.len() - index)
        } else {
            format!("rId{}", 101 + index)
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let masters = if self.masters.is_empty() {
            vec![vec!["Title Slide".to_string(), "Title and Content".to_string()]]
        } else {
            self.masters.clone()
        };

        let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
        let mut overrides: Vec<(String, String)> = vec![
            ("ppt/presentation.xml".into(), self.main_content_type.clone()),
            ("ppt/theme/theme1.xml".into(), "application/vnd.openxmlformats-officedocument.theme+xml".into()),
            ("docProps/app.xml".into(), "application/vnd.openxmlformats-officedocument.extended-properties+xml".into()),
        ];

        parts.push((
            "_rels/.rels".into(),
            relationships(&[
                ("rId1", "officeDocument", "ppt/presentation.xml"),
                ("rId2", "extended-properties", "docProps/app.xml"),
            ]),
        ));
        parts.push((
            "docProps/app.xml".into(),
            format!(
                r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Slides>{}</Slides></Properties>"#,
                XML_DECL,
                self.slides.len()
            )
            .into_bytes(),
        ));

        // Presentation part.
        let mut presentation_rels: Vec<(String, &str, String)> = Vec::new();
        let mut master_ids = String::new();
        for (m, _) in masters.iter().enumerate() {
            presentation_rels.push((
                format!("rId{}", m + 1),
                "slideMaster",
                format!("slideMasters/slideMaster{}.xml", m + 1),
            ));
            master_ids.push_str(&format!(
                r#"<p:sldMasterId id="{}" r:id="rId{}"/>"#,
                2147483648u64 + (m as u64) * 12,
                m + 1
            ));
        }
        presentation_rels.push(("rId99".into(), "theme", "theme/theme1.xml".into()));

        let mut slide_ids = String::new();
        let mut section_ids = String::new();
        let mut show_ids = String::new();
        for (i, _) in self.slides.iter().enumerate() {
            let rel_id = self.slide_rel_id(i);
            presentation_rels.push((rel_id.clone(), "slide", format!("slides/slide{}.xml", i + 1)));
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rel_id));
            section_ids.push_str(&format!(r#"<p14:sldId id="{}"/>"#, 256 + i));
            show_ids.push_str(&format!(r#"<p:sld r:id="{}"/>"#, rel_id));
        }

        let mut presentation = format!(
            r#"{}<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:sldMasterIdLst>{}</p:sldMasterIdLst>"#,
            XML_DECL, NS_A, NS_R, NS_P, master_ids
        );
        if !self.slides.is_empty() {
            presentation.push_str(&format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids));
        }
        presentation.push_str(r#"<p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/>"#);
        if self.custom_show {
            presentation.push_str(&format!(
                r#"<p:custShowLst><p:custShow name="Highlights" id="0"><p:sldLst>{}</p:sldLst></p:custShow></p:custShowLst>"#,
                show_ids
            ));
        }
        if self.sections {
            presentation.push_str(&format!(
                r#"<p:extLst><p:ext uri="{{521415D9-36F7-43E2-AB2F-B90AF26B5E84}}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Default Section" id="{{B5F5E3A1-0000-4000-8000-000000000001}}"><p14:sldIdLst>{}</p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>"#,
                section_ids
            ));
        }
        presentation.push_str("</p:presentation>");
        parts.push(("ppt/presentation.xml".into(), presentation.into_bytes()));
        let rel_refs: Vec<(&str, &str, &str)> = presentation_rels
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        parts.push(("ppt/_rels/presentation.xml.rels".into(), relationships(&rel_refs)));

        // Masters and layouts; layouts are numbered across all masters.
        let mut layout_number = 0;
        for (m, layouts) in masters.iter().enumerate() {
            let master_name = format!("ppt/slideMasters/slideMaster{}.xml", m + 1);
            let mut layout_ids = String::new();
            let mut master_rels: Vec<(String, &str, String)> = Vec::new();

            for (j, layout) in layouts.iter().enumerate() {
                layout_number += 1;
                let layout_name = format!("ppt/slideLayouts/slideLayout{}.xml", layout_number);
                layout_ids.push_str(&format!(
                    r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                    2147483649u64 + (m as u64) * 12 + j as u64,
                    j + 1
                ));
                master_rels.push((
                    format!("rId{}", j + 1),
                    "slideLayout",
                    format!("../slideLayouts/slideLayout{}.xml", layout_number),
                ));

                parts.push((
                    layout_name.clone(),
                    format!(
                        r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld name="{}"><p:spTree/></p:cSld></p:sldLayout>"#,
                        XML_DECL, NS_A, NS_R, NS_P, layout
                    )
                    .into_bytes(),
                ));
                parts.push((
                    format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", layout_number),
                    relationships(&[(
                        "rId1",
                        "slideMaster",
                        format!("../slideMasters/slideMaster{}.xml", m + 1).as_str(),
                    )]),
                ));
                overrides.push((layout_name, format!("{}.slideLayout+xml", CT_PML)));
            }
            master_rels.push((
                format!("rId{}", layouts.len() + 1),
                "theme",
                "../theme/theme1.xml".into(),
            ));

            parts.push((
                master_name.clone(),
                format!(
                    r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree/></p:cSld><p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#,
                    XML_DECL, NS_A, NS_R, NS_P, layout_ids
                )
                .into_bytes(),
            ));
            let rel_refs: Vec<(&str, &str, &str)> = master_rels
                .iter()
                .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
                .collect();
            parts.push((
                format!("ppt/slideMasters/_rels/slideMaster{}.xml.rels", m + 1),
                relationships(&rel_refs),
            ));
            overrides.push((master_name, format!("{}.slideMaster+xml", CT_PML)));
        }

        parts.push((
            "ppt/theme/theme1.xml".into(),
            format!(
                r#"{}<a:theme xmlns:a="{}" name="Office Theme"><a:themeElements/></a:theme>"#,
                XML_DECL, NS_A
            )
            .into_bytes(),
        ));

        // Slides, notes and media.
        let mut media: BTreeSet<String> = BTreeSet::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let number = i + 1;
            let slide_name = format!("ppt/slides/slide{}.xml", number);
            let mut slide_rels: Vec<(String, &str, String)> = vec![(
                "rId1".into(),
                "slideLayout",
                "../slideLayouts/slideLayout1.xml".into(),
            )];

            let mut link = String::new();
            if let Some(target) = slide.link_to {
                slide_rels.push(("rId4".into(), "slide", format!("slide{}.xml", target + 1)));
                link = r#"<a:hlinkClick r:id="rId4" action="ppaction://hlinksldjump"/>"#.to_string();
            }

            let mut picture = String::new();
            if let Some(image) = &slide.image {
                slide_rels.push(("rId2".into(), "image", format!("../media/{}", image)));
                media.insert(image.clone());
                picture = r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/></p:blipFill><p:spPr/></p:pic>"#.to_string();
            }

            if slide.notes {
                let notes_name = format!("ppt/notesSlides/notesSlide{}.xml", number);
                slide_rels.push((
                    "rId3".into(),
                    "notesSlide",
                    format!("../notesSlides/notesSlide{}.xml", number),
                ));
                parts.push((
                    notes_name.clone(),
                    format!(
                        r#"{}<p:notes xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree/></p:cSld></p:notes>"#,
                        XML_DECL, NS_A, NS_R, NS_P
                    )
                    .into_bytes(),
                ));
                parts.push((
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", number),
                    relationships(&[(
                        "rId1",
                        "slide",
                        format!("../slides/slide{}.xml", number).as_str(),
                    )]),
                ));
                overrides.push((notes_name, format!("{}.notesSlide+xml", CT_PML)));
            }

            parts.push((
                slide_name.clone(),
                format!(
                    r#"{}<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1">{}</p:cNvPr><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>{}</p:spTree></p:cSld></p:sld>"#,
                    XML_DECL, NS_A, NS_R, NS_P, link, slide.title, picture
                )
                .into_bytes(),
            ));
            let rel_refs: Vec<(&str, &str, &str)> = slide_rels
                .iter()
                .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
                .collect();
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships(&rel_refs),
            ));
            overrides.push((slide_name, format!("{}.slide+xml", CT_PML)));
        }

        for name in &media {
            let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
            data.extend_from_slice(name.as_bytes());
            parts.push((format!("ppt/media/{}", name), data));
        }

        let mut content_types = format!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>"#,
            XML_DECL
        );
        for (name, content_type) in &overrides {
            content_types.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                name, content_type
            ));
        }
        content_types.push_str("</Types>");

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", FileOptions::default())
            .unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();
        for (name, data) in &parts {
            let method = if name.starts_with("ppt/media/") {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            zip.start_file(name.as_str(), FileOptions::default().compression_method(method))
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

fn relationships(rels: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut xml = format!(
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        XML_DECL
    );
    for (id, kind, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml.into_bytes()
}

/// A one-entry stored ZIP whose central directory claims an uncompressed
/// size of `u64::MAX` through a ZIP64 extra field.
pub fn zip_with_bogus_size(name: &str) -> Vec<u8> {
    let name = name.as_bytes();
    let data = b"data";
    let dos_date: u16 = 0x21;

    let mut bytes = Vec::new();

    // Local file header.
    bytes.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    bytes.extend_from_slice(&45u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&dos_date.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(name);
    bytes.extend_from_slice(data);

    // Central directory header.
    let central_offset = bytes.len() as u32;
    bytes.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
    bytes.extend_from_slice(&45u16.to_le_bytes());
    bytes.extend_from_slice(&45u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&dos_date.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&12u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(name);
    bytes.extend_from_slice(&0x0001u16.to_le_bytes());
    bytes.extend_from_slice(&8u16.to_le_bytes());
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());
    let central_size = bytes.len() as u32 - central_offset;

    // End of central directory.
    bytes.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&central_size.to_le_bytes());
    bytes.extend_from_slice(&central_offset.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());

    bytes
}
