//! Domain types for source presentations and the files split out of them.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The package flavour of an OOXML presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Presentation (.pptx).
    Pptx,
    /// Macro-enabled presentation (.pptm).
    Pptm,
    /// Slide show (.ppsx).
    Ppsx,
    /// Macro-enabled slide show (.ppsm).
    Ppsm,
    /// Template (.potx).
    Potx,
    /// Macro-enabled template (.potm).
    Potm,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "pptm" => Some(Self::Pptm),
            "ppsx" => Some(Self::Ppsx),
            "ppsm" => Some(Self::Ppsm),
            "potx" => Some(Self::Potx),
            "potm" => Some(Self::Potm),
            _ => None,
        }
    }

    /// Check file magic bytes for a ZIP container.
    ///
    /// Every OOXML flavour shares the same signature, so this only tells
    /// whether the content can be an OOXML package at all.
    pub fn is_zip_magic(bytes: &[u8]) -> bool {
        bytes.len() >= 4 && bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
    }

    /// Detect format from the content type of the package's main part.
    pub fn from_main_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim();
        match content_type {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml" => {
                Some(Self::Pptx)
            }
            "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml" => Some(Self::Pptm),
            "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml" => {
                Some(Self::Ppsx)
            }
            "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml" => Some(Self::Ppsm),
            "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml" => {
                Some(Self::Potx)
            }
            "application/vnd.ms-powerpoint.template.macroEnabled.main+xml" => Some(Self::Potm),
            _ => None,
        }
    }

    /// The mimetype of a whole package in this format.
    pub fn mimetype(self) -> &'static str {
        match self {
            Self::Pptx => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            Self::Pptm => "application/vnd.ms-powerpoint.presentation.macroEnabled.12",
            Self::Ppsx => "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
            Self::Ppsm => "application/vnd.ms-powerpoint.slideshow.macroEnabled.12",
            Self::Potx => "application/vnd.openxmlformats-officedocument.presentationml.template",
            Self::Potm => "application/vnd.ms-powerpoint.template.macroEnabled.12",
        }
    }
}

/// Where the bytes of a source presentation live.
#[derive(Debug, Clone)]
pub enum PresentationContent {
    /// Content held in memory.
    Bytes(Vec<u8>),
    /// Content stored on disk.
    File(PathBuf),
}

/// A presentation to be split. Read-only input.
#[derive(Debug, Clone)]
pub struct SourcePresentation {
    /// Display name used to derive output filenames.
    pub filename: String,

    /// The full OOXML package.
    pub content: PresentationContent,

    /// Mimetype declared by whoever supplied the content, if any.
    pub mimetype: Option<String>,
}

impl SourcePresentation {
    /// Wrap in-memory content.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content: PresentationContent::Bytes(bytes),
            mimetype: None,
        }
    }

    /// Wrap a file on disk. The filename is taken from the path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            content: PresentationContent::File(path),
            mimetype: None,
        }
    }

    /// Set the declared mimetype.
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// The on-disk location of the content, if it lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            PresentationContent::File(path) => Some(path.as_path()),
            PresentationContent::Bytes(_) => None,
        }
    }

    /// Whether there is no content at all.
    pub fn is_empty(&self) -> io::Result<bool> {
        match &self.content {
            PresentationContent::Bytes(bytes) => Ok(bytes.is_empty()),
            PresentationContent::File(path) => Ok(fs::metadata(path)?.len() == 0),
        }
    }

    /// Read the whole content.
    pub fn read(&self) -> io::Result<Cow<'_, [u8]>> {
        match &self.content {
            PresentationContent::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            PresentationContent::File(path) => Ok(Cow::Owned(fs::read(path)?)),
        }
    }

    /// Duplicate the content byte-for-byte into `dest`, replacing whatever is there.
    pub fn copy_to(&self, dest: &Path) -> io::Result<u64> {
        match &self.content {
            PresentationContent::Bytes(bytes) => {
                fs::write(dest, bytes)?;
                Ok(bytes.len() as u64)
            }
            PresentationContent::File(path) => fs::copy(path, dest),
        }
    }
}

/// One output file produced by splitting: a complete presentation holding
/// a single slide of the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSlideFile {
    /// 0-based index of the slide in the source presentation.
    pub index: usize,

    /// Output filename (`{base}{index + 1}.pptx`).
    pub filename: String,

    /// Location of the file. Owned by the caller once returned.
    pub path: PathBuf,

    /// Mimetype carried over from the source.
    pub mimetype: String,
}

impl ExtractedSlideFile {
    /// 1-based slide number.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}
