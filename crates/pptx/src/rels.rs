//! Package relationships (`_rels/*.rels` parts).

use crate::xml::{attr_value, local_name};
use quick_xml::events::Event;
use quick_xml::Reader;
use slidesplit_core::{Error, Result};

/// Relationship type suffixes. Matching on the last path segment covers both
/// the transitional and the strict namespaces.
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str = "officeDocument";
    pub const SLIDE: &str = "slide";
    pub const SLIDE_LAYOUT: &str = "slideLayout";
    pub const SLIDE_MASTER: &str = "slideMaster";
    pub const NOTES_SLIDE: &str = "notesSlide";
}

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// Whether the target is an external resource (TargetMode="External").
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with `/{suffix}`.
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|last| last == suffix)
    }

    /// Absolute partname of the target, or `None` for external targets.
    pub fn target_partname(&self, source: &str) -> Option<String> {
        if self.external {
            None
        } else {
            Some(resolve_target(source, &self.target))
        }
    }
}

/// Name of the part holding the relationships of `source`.
///
/// The package itself is the empty source and maps to `_rels/.rels`.
pub fn rels_partname(source: &str) -> String {
    match source.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", source),
    }
}

/// The source part a relationships part belongs to, if `name` is one.
pub fn rels_source(name: &str) -> Option<String> {
    let (dir, file) = match name.rsplit_once('/') {
        Some(split) => split,
        None => return None,
    };
    let stem = file.strip_suffix(".rels")?;

    if dir == "_rels" {
        Some(stem.to_string())
    } else {
        dir.strip_suffix("/_rels")
            .map(|parent| format!("{}/{}", parent, stem))
    }
}

/// Resolve a relationship target against the part that declares it.
pub fn resolve_target(source: &str, target: &str) -> String {
    let target = target.split('#').next().unwrap_or_default();
    let target = percent_decode(target);

    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        match source.rsplit_once('/') {
            Some((dir, _)) => format!("{}/{}", dir, target),
            None => target.clone(),
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}

/// Parse the XML of a relationships part.
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let id = attr_value(e, b"Id").unwrap_or_default();
                let rel_type = attr_value(e, b"Type").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                let external = attr_value(e, b"TargetMode")
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));

                relationships.push(Relationship {
                    id,
                    rel_type,
                    target,
                    external,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}
