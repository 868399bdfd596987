//! Source format detection by file extension.

use std::path::Path;

/// Image formats accepted as conversion sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// Detect the source format from the path's extension (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use webpconv_common::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_path(Path::new("a.PNG")), Some(SourceFormat::Png));
    /// assert_eq!(SourceFormat::from_path(Path::new("a.jpeg")), Some(SourceFormat::Jpeg));
    /// assert_eq!(SourceFormat::from_path(Path::new("a.gif")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Whether the source should be encoded losslessly.
    pub fn is_png(&self) -> bool {
        matches!(self, Self::Png)
    }
}

/// Check if a path has a PNG extension.
pub fn is_png(path: &Path) -> bool {
    SourceFormat::from_path(path).is_some_and(|f| f.is_png())
}
