//! Content-based mimetype detection for OOXML presentations.

use crate::package::Package;
use slidesplit_core::{
    DeclaredMimetype, Error, ExtensionMimetype, MimetypeChain, MimetypeResolver,
    PresentationFormat, Result, SourcePresentation,
};

/// Detects the mimetype by opening the package and looking at the content
/// type of its main part.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageMimetype;

impl MimetypeResolver for PackageMimetype {
    fn name(&self) -> &'static str {
        "package content"
    }

    fn resolve(&self, source: &SourcePresentation) -> Result<String> {
        let content = source.read()?;
        if !PresentationFormat::is_zip_magic(&content) {
            return Err(Error::MimetypeNotFound(
                "content is not a ZIP package".to_string(),
            ));
        }

        let package = Package::from_bytes(&content)?;
        let main_part = package.main_part()?;
        let content_type = package.content_type(&main_part)?.ok_or_else(|| {
            Error::MimetypeNotFound(format!("main part '{}' has no content type", main_part))
        })?;

        PresentationFormat::from_main_content_type(&content_type)
            .map(|format| format.mimetype().to_string())
            .ok_or_else(|| {
                Error::MimetypeNotFound(format!(
                    "main part content type '{}' is not a presentation",
                    content_type
                ))
            })
    }
}

/// The resolution order used when splitting: the declared type, then
/// detection from the content, then detection from the file name.
pub fn default_mimetype_chain() -> MimetypeChain {
    MimetypeChain::new()
        .with(DeclaredMimetype)
        .with(PackageMimetype)
        .with(ExtensionMimetype)
}
