//! In-memory OOXML package: the parts of a ZIP archive plus the
//! `[Content_Types].xml` and relationship lookups built on top of them.

use crate::rels::{self, parse_relationships, rel_type, Relationship};
use crate::xml::{as_xml, attr_value, local_name};
use quick_xml::events::Event;
use quick_xml::Reader;
use slidesplit_core::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Upper bound on buffer preallocation per entry. Entry sizes come from the
/// archive headers and cannot be trusted.
const PREALLOC_LIMIT: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
struct PackagePart {
    name: String,
    data: Vec<u8>,
    /// Whether the part was stored without compression.
    stored: bool,
}

/// All parts of an OOXML package, in archive order.
///
/// Part names never carry a leading slash and compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Archive order. Removed parts leave a `None` slot behind.
    parts: Vec<Option<PackagePart>>,
    /// Lowercased part name to its slot in `parts`.
    index: HashMap<String, usize>,
}

impl Package {
    /// Read a package from a ZIP archive.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut package = Self::default();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let stored = file.compression() == CompressionMethod::Stored;
            let capacity = usize::try_from(file.size().min(PREALLOC_LIMIT)).unwrap_or(0);
            let mut data = Vec::with_capacity(capacity);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;

            package.insert(PackagePart { name, data, stored });
        }

        if !package.contains(CONTENT_TYPES_PART) {
            return Err(Error::InvalidPackage(format!(
                "missing {}",
                CONTENT_TYPES_PART
            )));
        }

        log::debug!("Read package with {} parts", package.len());
        Ok(package)
    }

    /// Read a package from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read a package from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    fn slot(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    fn get(&self, name: &str) -> Option<&PackagePart> {
        self.slot(name).and_then(|i| self.parts[i].as_ref())
    }

    /// Add a part, replacing any part with the same name in place.
    fn insert(&mut self, part: PackagePart) {
        match self.slot(&part.name) {
            Some(i) => self.parts[i] = Some(part),
            None => {
                self.index.insert(part.name.to_lowercase(), self.parts.len());
                self.parts.push(Some(part));
            }
        }
    }

    fn iter(&self) -> impl Iterator<Item = &PackagePart> {
        self.parts.iter().flatten()
    }

    /// Whether a part with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.get(name).map(|p| p.data.as_slice())
    }

    /// A part decoded as XML text. Missing parts are an error.
    pub fn part_xml(&self, name: &str) -> Result<&str> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::InvalidPackage(format!("missing part '{}'", name)))?;
        as_xml(name, data)
    }

    /// Names of all parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|p| p.name.as_str())
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Replace the content of a part, or append it if it does not exist.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        if let Some(i) = self.slot(name) {
            if let Some(part) = self.parts[i].as_mut() {
                part.data = data;
                return;
            }
        }
        self.insert(PackagePart {
            name: name.to_string(),
            data,
            stored: false,
        });
    }

    /// Remove a part. Returns whether it existed.
    pub fn remove_part(&mut self, name: &str) -> bool {
        match self.index.remove(&name.to_lowercase()) {
            Some(i) => {
                self.parts[i] = None;
                true
            }
            None => false,
        }
    }

    /// Relationships declared by `source` (`""` for the package itself).
    ///
    /// A source without a relationships part has no relationships.
    pub fn relationships(&self, source: &str) -> Result<Vec<Relationship>> {
        let rels_name = rels::rels_partname(source);
        match self.part(&rels_name) {
            Some(data) => parse_relationships(as_xml(&rels_name, data)?),
            None => Ok(Vec::new()),
        }
    }

    /// Partname of the main document part, found through the package's
    /// `officeDocument` relationship.
    pub fn main_part(&self) -> Result<String> {
        self.relationships("")?
            .iter()
            .find(|rel| rel.is_type(rel_type::OFFICE_DOCUMENT))
            .and_then(|rel| rel.target_partname(""))
            .filter(|name| self.contains(name))
            .ok_or_else(|| Error::InvalidPackage("no main document part".to_string()))
    }

    /// Content type of a part: its `Override` entry if present, otherwise
    /// the `Default` entry for its extension.
    pub fn content_type(&self, partname: &str) -> Result<Option<String>> {
        let xml = self.part_xml(CONTENT_TYPES_PART)?;
        let extension = partname.rsplit_once('.').map(|(_, ext)| ext);

        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut by_default = None;

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"Override" => {
                            let matches = attr_value(e, b"PartName").is_some_and(|p| {
                                p.trim_start_matches('/').eq_ignore_ascii_case(partname)
                            });
                            if matches {
                                return Ok(attr_value(e, b"ContentType"));
                            }
                        }
                        b"Default" if by_default.is_none() => {
                            let matches = attr_value(e, b"Extension")
                                .zip(extension)
                                .is_some_and(|(ext, wanted)| ext.eq_ignore_ascii_case(wanted));
                            if matches {
                                by_default = attr_value(e, b"ContentType");
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing {}: {}",
                        CONTENT_TYPES_PART, e
                    )));
                }
                _ => {}
            }
        }

        Ok(by_default)
    }

    /// Write every part to a ZIP archive, in archive order.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);

        for part in self.iter() {
            let method = if part.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = FileOptions::default().compression_method(method);

            zip.start_file(part.name.as_str(), options)
                .map_err(zip_write_error)?;
            zip.write_all(&part.data)?;
        }

        zip.finish().map_err(zip_write_error)
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write the package to a file, replacing its content.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}

fn zip_write_error(e: zip::result::ZipError) -> Error {
    match e {
        zip::result::ZipError::Io(io) => Error::IoError(io),
        other => Error::ZipError(format!("Failed to write ZIP: {}", other)),
    }
}
