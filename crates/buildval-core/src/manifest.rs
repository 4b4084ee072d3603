// Contract types exchanged with the external collaborators that acquire
// image metadata and per-image package manifests.

/// Declared entrypoint and command lists from an image inspection record.
#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    pub entrypoint: Vec<String>,
    pub cmd: Vec<String>,
}

/// Decoded package-level listing of the software installed in an image.
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    pub packages: Vec<Package>,
}

/// One installed package.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Installed file paths, when the package metadata kind records them
    /// (dpkg-style database entries do). `None` packages are skipped
    /// during entrypoint verification; this is the extension point for
    /// additional metadata kinds.
    pub files: Option<Vec<String>>,
}

impl Package {
    /// A package whose metadata kind records installed file paths.
    pub fn with_files(
        name: impl Into<String>,
        version: impl Into<String>,
        files: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            files: Some(files),
        }
    }

    /// A package whose metadata kind does not expose a file list.
    pub fn without_files(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            files: None,
        }
    }
}
