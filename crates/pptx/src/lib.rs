//! PPTX (Office Open XML) backend for splitting presentations.
//!
//! A .pptx file is a ZIP archive of XML parts linked by relationships. This
//! crate edits such packages at the part level and builds the one-file-per-
//! slide splitter on top.

pub mod detect;
pub mod package;
pub mod presentation;
pub mod rels;
pub mod split;
pub mod xml;

#[cfg(test)]
mod fixture;

pub use detect::{default_mimetype_chain, PackageMimetype};
pub use package::Package;
pub use presentation::{Presentation, SlideLayout, SlideMaster, SlideRef};
pub use split::PresentationSplitter;
