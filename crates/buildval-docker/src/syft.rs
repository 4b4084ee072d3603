// Decodes the subset of a syft-json SBOM document the validator needs:
// package identities plus dpkg-style installed-file lists. Metadata kinds
// without a file listing lower to `files: None` and are skipped during
// entrypoint verification.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;

use buildval_core::{Package, PackageManifest};

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default, rename = "metadataType")]
    metadata_type: String,
    #[serde(default)]
    metadata: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct DpkgMetadata {
    #[serde(default)]
    files: Vec<FileRecord>,
}

#[derive(Debug, Deserialize)]
struct FileRecord {
    #[serde(default)]
    path: String,
}

/// Metadata kinds that record installed file paths. syft renamed the dpkg
/// kind between format versions; both spellings appear in the wild.
fn has_file_listing(metadata_type: &str) -> bool {
    matches!(metadata_type, "dpkg-db-entry" | "DpkgMetadata")
}

/// Lower a syft-json document to the core `PackageManifest` contract.
pub fn decode_manifest(reader: impl Read) -> Result<PackageManifest> {
    let document: Document =
        serde_json::from_reader(reader).context("Failed to decode syft-json document")?;

    let mut packages = Vec::with_capacity(document.artifacts.len());
    for artifact in document.artifacts {
        let files = if has_file_listing(&artifact.metadata_type) {
            let metadata: DpkgMetadata = if artifact.metadata.is_null() {
                DpkgMetadata::default()
            } else {
                serde_json::from_value(artifact.metadata).with_context(|| {
                    format!("Malformed dpkg metadata for package '{}'", artifact.name)
                })?
            };
            Some(metadata.files.into_iter().map(|f| f.path).collect())
        } else {
            None
        };
        packages.push(Package {
            name: artifact.name,
            version: artifact.version,
            files,
        });
    }
    Ok(PackageManifest { packages })
}
