//! Output filenames for split slides.

/// Separator guaranteed between the base name and the slide number.
pub const SEPARATOR: char = '-';

/// Extension of every produced file.
pub const OUTPUT_EXTENSION: &str = "pptx";

/// Builds `{base}{number}.pptx` filenames from a source filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFilenameTemplate {
    base: String,
}

impl OutputFilenameTemplate {
    /// Derive the template from a filename hint.
    ///
    /// Any directory prefix and the last extension are stripped, then the
    /// separator is appended unless the name already ends with it.
    pub fn from_hint(hint: &str) -> Self {
        let name = hint.rsplit(['/', '\\']).next().unwrap_or(hint);
        let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);

        let mut base = stem.to_string();
        if !base.ends_with(SEPARATOR) {
            base.push(SEPARATOR);
        }

        Self { base }
    }

    /// The base name including its trailing separator.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Filename for the slide at 0-based `index`.
    pub fn filename_for(&self, index: usize) -> String {
        format!("{}{}.{}", self.base, index + 1, OUTPUT_EXTENSION)
    }
}
