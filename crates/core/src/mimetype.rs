//! Mimetype resolution for source presentations.
//!
//! Resolution is an ordered list of strategies. The first one that yields a
//! mimetype wins; if all of them fail, the last failure is reported.

use crate::error::{Error, Result};
use crate::types::{PresentationFormat, SourcePresentation};
use std::path::Path;

/// A single way of determining the mimetype of a source presentation.
pub trait MimetypeResolver {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Resolve the mimetype, or fail with [`Error::MimetypeNotFound`].
    fn resolve(&self, source: &SourcePresentation) -> Result<String>;
}

/// Uses the mimetype the source declares about itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredMimetype;

impl MimetypeResolver for DeclaredMimetype {
    fn name(&self) -> &'static str {
        "declared"
    }

    fn resolve(&self, source: &SourcePresentation) -> Result<String> {
        match source.mimetype.as_deref().map(str::trim) {
            Some(mimetype) if !mimetype.is_empty() => Ok(mimetype.to_string()),
            _ => Err(Error::MimetypeNotFound(
                "no mimetype declared by the source".to_string(),
            )),
        }
    }
}

/// Detects the mimetype from a file extension.
///
/// The on-disk path is consulted first, then the filename hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionMimetype;

impl MimetypeResolver for ExtensionMimetype {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn resolve(&self, source: &SourcePresentation) -> Result<String> {
        let from_path = source.path().and_then(format_from_path);
        let format = from_path.or_else(|| format_from_path(Path::new(&source.filename)));

        format.map(|f| f.mimetype().to_string()).ok_or_else(|| {
            Error::MimetypeNotFound(format!(
                "unrecognized extension for '{}'",
                source.filename
            ))
        })
    }
}

fn format_from_path(path: &Path) -> Option<PresentationFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(PresentationFormat::from_extension)
}

/// Ordered fallback over several resolvers.
#[derive(Default)]
pub struct MimetypeChain {
    resolvers: Vec<Box<dyn MimetypeResolver + Send + Sync>>,
}

impl MimetypeChain {
    /// Create an empty chain. An empty chain never resolves anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver; it is tried after every resolver added before it.
    pub fn with(mut self, resolver: impl MimetypeResolver + Send + Sync + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Try each resolver in order.
    pub fn resolve(&self, source: &SourcePresentation) -> Result<String> {
        let mut last_error = None;

        for resolver in &self.resolvers {
            match resolver.resolve(source) {
                Ok(mimetype) => {
                    log::debug!(
                        "Mimetype of '{}' resolved by {}: {}",
                        source.filename,
                        resolver.name(),
                        mimetype
                    );
                    return Ok(mimetype);
                }
                Err(e) => {
                    log::debug!(
                        "Mimetype resolver {} failed for '{}': {}",
                        resolver.name(),
                        source.filename,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(Error::MimetypeNotFound(reason)) => Error::MimetypeNotFound(format!(
                "cannot get a mimetype for '{}': {}",
                source.filename, reason
            )),
            Some(other) => Error::MimetypeNotFound(format!(
                "cannot get a mimetype for '{}': {}",
                source.filename, other
            )),
            None => Error::MimetypeNotFound("no mimetype resolvers configured".to_string()),
        })
    }
}

impl std::fmt::Debug for MimetypeChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}
