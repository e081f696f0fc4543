//! Core domain types, error taxonomy, output naming, mimetype resolution
//! and temp storage for splitting presentations into one file per slide.

pub mod error;
pub mod mimetype;
pub mod naming;
pub mod storage;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use mimetype::{DeclaredMimetype, ExtensionMimetype, MimetypeChain, MimetypeResolver};
pub use naming::OutputFilenameTemplate;
pub use storage::{DirectoryStorage, TempStorage};
pub use types::{ExtractedSlideFile, PresentationContent, PresentationFormat, SourcePresentation};
