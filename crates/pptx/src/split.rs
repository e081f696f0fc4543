//! Splitting a presentation into one presentation file per slide.
//!
//! There is no reliable way to lift a single slide out of a package together
//! with everything it references (layouts, masters, media, ...). Instead the
//! whole source is copied once per slide and every other slide is deleted
//! from the copy, which keeps all references intact.

use crate::detect::default_mimetype_chain;
use crate::presentation::Presentation;
use slidesplit_core::{
    DirectoryStorage, Error, ExtractedSlideFile, MimetypeChain, OutputFilenameTemplate, Result,
    SourcePresentation, TempStorage,
};
use std::path::Path;

/// Splits presentations into single-slide presentation files.
pub struct PresentationSplitter {
    storage: Box<dyn TempStorage + Send + Sync>,
    mimetypes: MimetypeChain,
}

impl PresentationSplitter {
    /// Splitter writing to the system temp directory with the default
    /// mimetype resolution order.
    pub fn new() -> Self {
        Self {
            storage: Box::new(DirectoryStorage::system()),
            mimetypes: default_mimetype_chain(),
        }
    }

    /// Use `storage` for the produced files.
    pub fn with_storage(mut self, storage: impl TempStorage + Send + Sync + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    /// Use a custom mimetype resolution order.
    pub fn with_mimetypes(mut self, mimetypes: MimetypeChain) -> Self {
        self.mimetypes = mimetypes;
        self
    }

    /// Split `source` into one file per slide, in slide order.
    ///
    /// An absent or empty source and a presentation without slides all give
    /// an empty result. Any failure aborts the whole split; files produced
    /// for earlier slides are left where they are.
    pub fn split<'a>(
        &self,
        source: impl Into<Option<&'a SourcePresentation>>,
    ) -> Result<Vec<ExtractedSlideFile>> {
        let Some(source) = source.into() else {
            return Ok(Vec::new());
        };
        if source.is_empty().map_err(|e| source_error(source, e))? {
            log::debug!("Source '{}' is empty, nothing to split", source.filename);
            return Ok(Vec::new());
        }

        let mimetype = self.mimetypes.resolve(source)?;
        let template = OutputFilenameTemplate::from_hint(&source.filename);

        let slide_count = {
            let content = source.read().map_err(|e| source_error(source, e))?;
            Presentation::from_bytes(&content)?.slide_count()
        };
        log::info!(
            "Splitting '{}' into {} single-slide files",
            source.filename,
            slide_count
        );

        let mut extracted = Vec::with_capacity(slide_count);
        for index in 0..slide_count {
            let filename = template.filename_for(index);
            let path = self
                .storage
                .allocate(&filename)
                .map_err(|e| e.for_slide(index, &filename))?;

            extract_slide(source, index, &path).map_err(|e| e.for_slide(index, &path))?;
            log::debug!("Slide {} written to {}", index + 1, path.display());

            extracted.push(ExtractedSlideFile {
                index,
                filename,
                path,
                mimetype: mimetype.clone(),
            });
        }

        Ok(extracted)
    }

    /// Merge single-slide presentations back into one. Not supported.
    pub fn merge_slides(&self, _slides: &[ExtractedSlideFile]) -> Result<SourcePresentation> {
        Err(Error::NotImplemented("merging slides into one presentation"))
    }
}

impl Default for PresentationSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy the whole source to `path` and trim the copy down to slide `index`.
fn extract_slide(source: &SourcePresentation, index: usize, path: &Path) -> Result<()> {
    source.copy_to(path).map_err(|e| Error::Storage {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut copy = Presentation::open(path)?;

    // Deleting position 0 repeatedly shifts the target slide down to 0.
    for _ in 0..index {
        copy.delete_slide_at(0)?;
    }
    let remaining = copy.slide_count();
    for _ in 1..remaining {
        copy.delete_slide_at(1)?;
    }
    copy.compact()?;

    copy.save(path)
}

fn source_error(source: &SourcePresentation, e: std::io::Error) -> Error {
    Error::SourceRead {
        name: source.filename.clone(),
        source: e,
    }
}
