//! Mutable handle on a PresentationML package.
//!
//! Supports what splitting needs: counting slides, deleting a slide by
//! position, listing masters and layouts, and writing the package back.

use crate::package::{Package, CONTENT_TYPES_PART};
use crate::rels::{self, rel_type, Relationship};
use crate::xml::{attr_value, local_name, rel_id_attr, retain_elements};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use slidesplit_core::{Error, PresentationFormat, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// A slide entry of the presentation's slide list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Numeric slide id (`p:sldId/@id`).
    pub id: String,
    /// Relationship id from the presentation part (`p:sldId/@r:id`).
    pub rel_id: String,
    /// Partname of the slide.
    pub partname: String,
}

/// A slide layout and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideLayout {
    /// `p:cSld/@name`, empty when the layout has no name.
    pub name: String,
    pub partname: String,
}

/// A slide master with its layouts in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideMaster {
    pub partname: String,
    pub layouts: Vec<SlideLayout>,
}

/// An opened presentation.
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    main_part: String,
    slides: Vec<SlideRef>,
}

impl Presentation {
    /// Open a presentation from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Open a presentation from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Wrap a package, checking that its main part is a presentation.
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = package.main_part()?;

        let content_type = package.content_type(&main_part)?.unwrap_or_default();
        if PresentationFormat::from_main_content_type(&content_type).is_none() {
            return Err(Error::InvalidPackage(format!(
                "main part '{}' is not a presentation (content type '{}')",
                main_part, content_type
            )));
        }

        let slides = read_slide_list(&package, &main_part)?;
        log::debug!("Opened presentation with {} slides", slides.len());

        Ok(Self {
            package,
            main_part,
            slides,
        })
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[SlideRef] {
        &self.slides
    }

    /// XML of the slide at `position`.
    pub fn slide_xml(&self, position: usize) -> Result<&str> {
        let slide = self.slides.get(position).ok_or(Error::SlideOutOfRange {
            position,
            count: self.slides.len(),
        })?;
        self.package.part_xml(&slide.partname)
    }

    /// Delete the slide currently at `position`.
    ///
    /// Later slides shift down by one. Only the slide entry, its relationship
    /// and the slide part itself are removed; call [`Presentation::compact`]
    /// once all deletions are done to drop what the deleted slides left behind.
    pub fn delete_slide_at(&mut self, position: usize) -> Result<()> {
        if position >= self.slides.len() {
            return Err(Error::SlideOutOfRange {
                position,
                count: self.slides.len(),
            });
        }
        let slide = self.slides.remove(position);
        log::debug!("Deleting slide {} ({})", position, slide.partname);

        // Slide list, section and custom show entries.
        let presentation_xml = retain_elements(self.package.part_xml(&self.main_part)?, |e| {
            let name = e.name();
            match local_name(name.as_ref()) {
                b"sldId" => attr_value(e, b"id").as_deref() != Some(slide.id.as_str()),
                b"sld" => rel_id_attr(e).as_deref() != Some(slide.rel_id.as_str()),
                _ => true,
            }
        })?;
        self.package
            .set_part(&self.main_part, presentation_xml.into_bytes());

        self.remove_relationships(&rels::rels_partname(&self.main_part), |rel| {
            rel.id == slide.rel_id
        })?;

        self.package.remove_part(&slide.partname);
        self.package.remove_part(&rels::rels_partname(&slide.partname));

        Ok(())
    }

    /// Clean up after slide deletions.
    ///
    /// Parts no longer reachable from the package root (notes, comments,
    /// media only deleted slides used) are removed, relationships pointing
    /// at missing parts are dropped, and `[Content_Types].xml` loses the
    /// overrides of missing parts. Shared masters, layouts and media stay.
    pub fn compact(&mut self) -> Result<()> {
        let pruned = self.prune_unreachable()?;
        self.drop_dangling_relationships()?;
        self.remove_stale_overrides()?;
        log::debug!("Compacted package, {} unreachable parts removed", pruned);
        Ok(())
    }

    /// Remove every part that can no longer be reached from the package
    /// root by following internal relationships. Returns how many went.
    fn prune_unreachable(&mut self) -> Result<usize> {
        let mut reachable: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(String::new());

        while let Some(source) = queue.pop_front() {
            for rel in self.package.relationships(&source)? {
                let Some(target) = rel.target_partname(&source) else {
                    continue;
                };
                if self.package.contains(&target) && reachable.insert(target.to_lowercase()) {
                    queue.push_back(target);
                }
            }
        }

        let doomed: Vec<String> = self
            .package
            .part_names()
            .filter(|name| !name.eq_ignore_ascii_case(CONTENT_TYPES_PART))
            .filter(|name| match rels::rels_source(name) {
                Some(source) => !source.is_empty() && !reachable.contains(&source.to_lowercase()),
                None => !reachable.contains(&name.to_lowercase()),
            })
            .map(str::to_string)
            .collect();

        for name in &doomed {
            log::trace!("Pruning unreachable part {}", name);
            self.package.remove_part(name);
        }

        Ok(doomed.len())
    }

    /// Remove relationships whose internal target no longer exists, such as
    /// a hyperlink to a deleted slide.
    fn drop_dangling_relationships(&mut self) -> Result<()> {
        let rels_parts: Vec<(String, String)> = self
            .package
            .part_names()
            .filter_map(|name| rels::rels_source(name).map(|source| (name.to_string(), source)))
            .collect();

        for (rels_name, source) in rels_parts {
            let dangling: HashSet<String> = self
                .package
                .relationships(&source)?
                .into_iter()
                .filter(|rel| {
                    rel.target_partname(&source)
                        .is_some_and(|target| !self.package.contains(&target))
                })
                .map(|rel| rel.id)
                .collect();

            if !dangling.is_empty() {
                log::debug!("Dropping {} dangling relationships from {}", dangling.len(), rels_name);
                self.remove_relationships(&rels_name, |rel| dangling.contains(&rel.id))?;
            }
        }

        Ok(())
    }

    fn remove_relationships<F>(&mut self, rels_name: &str, mut doomed: F) -> Result<()>
    where
        F: FnMut(&Relationship) -> bool,
    {
        let Some(data) = self.package.part(rels_name) else {
            return Ok(());
        };
        let xml = crate::xml::as_xml(rels_name, data)?;

        let rewritten = retain_elements(xml, |e| {
            let name = e.name();
            if local_name(name.as_ref()) != b"Relationship" {
                return true;
            }
            let rel = Relationship {
                id: attr_value(e, b"Id").unwrap_or_default(),
                rel_type: attr_value(e, b"Type").unwrap_or_default(),
                target: attr_value(e, b"Target").unwrap_or_default(),
                external: attr_value(e, b"TargetMode")
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("External")),
            };
            !doomed(&rel)
        })?;

        self.package.set_part(rels_name, rewritten.into_bytes());
        Ok(())
    }

    fn remove_stale_overrides(&mut self) -> Result<()> {
        let package = &self.package;
        let rewritten = retain_elements(package.part_xml(CONTENT_TYPES_PART)?, |e| {
            let name = e.name();
            if local_name(name.as_ref()) != b"Override" {
                return true;
            }
            attr_value(e, b"PartName")
                .map_or(true, |partname| package.contains(partname.trim_start_matches('/')))
        })?;

        self.package
            .set_part(CONTENT_TYPES_PART, rewritten.into_bytes());
        Ok(())
    }

    /// Masters in `p:sldMasterIdLst` order, each with its layouts in
    /// `p:sldLayoutIdLst` order.
    pub fn slide_masters_list(&self) -> Result<Vec<SlideMaster>> {
        let presentation_rels = self.package.relationships(&self.main_part)?;
        let master_ids =
            collect_rel_ids(self.package.part_xml(&self.main_part)?, b"sldMasterId")?;

        let mut masters = Vec::with_capacity(master_ids.len());
        for rel_id in master_ids {
            let master_part = resolve_rel_id(&presentation_rels, &self.main_part, &rel_id)?;
            let master_xml = self.package.part_xml(&master_part)?;
            let master_rels = self.package.relationships(&master_part)?;

            let mut layouts = Vec::new();
            for layout_rel_id in collect_rel_ids(master_xml, b"sldLayoutId")? {
                let layout_part = resolve_rel_id(&master_rels, &master_part, &layout_rel_id)?;
                let name = common_slide_name(self.package.part_xml(&layout_part)?)?;
                layouts.push(SlideLayout {
                    name,
                    partname: layout_part,
                });
            }

            masters.push(SlideMaster {
                partname: master_part,
                layouts,
            });
        }

        Ok(masters)
    }

    /// Map each layout name to the master owning it.
    ///
    /// Layout names are assumed unique across masters. When two masters
    /// have a layout with the same name, the later master wins.
    pub fn slide_masters(&self) -> Result<HashMap<String, SlideMaster>> {
        let mut by_layout = HashMap::new();
        for master in self.slide_masters_list()? {
            for layout in &master.layouts {
                by_layout.insert(layout.name.clone(), master.clone());
            }
        }
        Ok(by_layout)
    }

    /// Serialize the presentation to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.to_bytes()
    }

    /// Write the presentation to a file, replacing its content.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.package.save(path)
    }
}

/// Read `p:sldIdLst` (the direct child of the root element) in order.
fn read_slide_list(package: &Package, main_part: &str) -> Result<Vec<SlideRef>> {
    let xml = package.part_xml(main_part)?;
    let rels = package.relationships(main_part)?;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut depth = 0usize;
    let mut list_depth = None;
    let mut slides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sldIdLst" if depth == 2 => list_depth = Some(depth),
                    b"sldId" if list_depth == Some(depth - 1) => {
                        slides.push(slide_ref(e, &rels, main_part)?);
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"sldId" && list_depth == Some(depth) {
                    slides.push(slide_ref(e, &rels, main_part)?);
                }
            }
            Ok(Event::End(_)) => {
                if list_depth == Some(depth) {
                    list_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing {}: {}",
                    main_part, e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

fn slide_ref(
    e: &quick_xml::events::BytesStart<'_>,
    rels: &[Relationship],
    main_part: &str,
) -> Result<SlideRef> {
    let id = attr_value(e, b"id").unwrap_or_default();
    let rel_id = rel_id_attr(e)
        .ok_or_else(|| Error::InvalidPackage(format!("slide {} has no relationship id", id)))?;
    let partname = resolve_rel_id(rels, main_part, &rel_id)?;

    Ok(SlideRef {
        id,
        rel_id,
        partname,
    })
}

fn resolve_rel_id(rels: &[Relationship], source: &str, rel_id: &str) -> Result<String> {
    rels.iter()
        .find(|rel| rel.id == rel_id)
        .and_then(|rel| rel.target_partname(source))
        .ok_or_else(|| {
            Error::InvalidPackage(format!(
                "relationship '{}' of '{}' does not point to a part",
                rel_id, source
            ))
        })
}

/// Relationship ids of every element named `element` (any namespace prefix).
fn collect_rel_ids(xml: &str, element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == element =>
            {
                if let Some(id) = rel_id_attr(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing XML: {}", e))),
            _ => {}
        }
    }

    Ok(ids)
}

/// The `name` attribute of the first `cSld` element.
fn common_slide_name(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"cSld" =>
            {
                return Ok(attr_value(e, b"name").unwrap_or_default());
            }
            Ok(Event::Eof) => return Ok(String::new()),
            Err(e) => return Err(Error::XmlError(format!("Error parsing XML: {}", e))),
            _ => {}
        }
    }
}
