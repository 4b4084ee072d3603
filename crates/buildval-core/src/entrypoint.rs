// Entrypoint resolution and verification.
// Computes the effective entrypoint for a step and checks that it is an
// installed file of some package in the image's manifest.

use crate::error::ValidationError;
use crate::manifest::{ImageMetadata, PackageManifest};

/// Compute the effective entrypoint with strict fallback priority:
/// explicit override, then the first declared entrypoint element, then
/// the first declared command element. Empty strings count as absent.
pub fn resolve(
    step_override: Option<&str>,
    metadata: &ImageMetadata,
    image: &str,
) -> Result<String, ValidationError> {
    if let Some(ep) = step_override.filter(|ep| !ep.is_empty()) {
        return Ok(ep.to_string());
    }
    if let Some(ep) = metadata.entrypoint.first().filter(|ep| !ep.is_empty()) {
        return Ok(ep.clone());
    }
    if let Some(cmd) = metadata.cmd.first().filter(|cmd| !cmd.is_empty()) {
        return Ok(cmd.clone());
    }
    Err(ValidationError::MissingEntrypoint {
        image: image.to_string(),
    })
}

/// Succeeds when any package exposing an installed-file list contains an
/// entry exactly equal to `entrypoint`. Packages whose metadata kind has
/// no file list are skipped without affecting the result.
pub fn verify(
    entrypoint: &str,
    manifest: &PackageManifest,
    image: &str,
) -> Result<(), ValidationError> {
    for package in &manifest.packages {
        let Some(files) = &package.files else { continue };
        if files.iter().any(|f| f == entrypoint) {
            tracing::debug!(
                target: "entrypoint",
                "Found '{}' in package '{}'",
                entrypoint,
                package.name
            );
            return Ok(());
        }
    }
    Err(ValidationError::EntrypointNotFound {
        image: image.to_string(),
        entrypoint: entrypoint.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Package;

    fn metadata(entrypoint: &[&str], cmd: &[&str]) -> ImageMetadata {
        ImageMetadata {
            entrypoint: entrypoint.iter().map(|s| s.to_string()).collect(),
            cmd: cmd.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn override_beats_declared_entrypoint() {
        let md = metadata(&["/bin/sh"], &["/bin/bash"]);
        let ep = resolve(Some("/usr/bin/make"), &md, "img").unwrap();
        assert_eq!(ep, "/usr/bin/make");
    }

    #[test]
    fn declared_entrypoint_beats_command() {
        let md = metadata(&["/bin/sh"], &["/bin/bash"]);
        let ep = resolve(None, &md, "img").unwrap();
        assert_eq!(ep, "/bin/sh");
    }

    #[test]
    fn command_is_last_fallback() {
        let md = metadata(&[], &["/bin/bash"]);
        let ep = resolve(None, &md, "img").unwrap();
        assert_eq!(ep, "/bin/bash");
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let md = metadata(&[""], &["/bin/bash"]);
        let ep = resolve(Some(""), &md, "img").unwrap();
        assert_eq!(ep, "/bin/bash");
    }

    #[test]
    fn all_empty_is_an_error() {
        let md = metadata(&[], &[]);
        let err = resolve(None, &md, "gcr.io/builder").unwrap_err();
        assert!(matches!(err, ValidationError::MissingEntrypoint { ref image } if image == "gcr.io/builder"));
    }

    #[test]
    fn verify_finds_exact_file_match() {
        let manifest = PackageManifest {
            packages: vec![Package::with_files(
                "bash",
                "5.1",
                vec!["/bin/bash".to_string(), "/etc/bash.bashrc".to_string()],
            )],
        };
        verify("/bin/bash", &manifest, "img").unwrap();
    }

    #[test]
    fn verify_skips_packages_without_file_lists() {
        let manifest = PackageManifest {
            packages: vec![
                Package::without_files("pip-thing", "1.0"),
                Package::with_files("coreutils", "9.1", vec!["/usr/bin/env".to_string()]),
            ],
        };
        verify("/usr/bin/env", &manifest, "img").unwrap();
    }

    #[test]
    fn verify_no_match_names_image_and_entrypoint() {
        let manifest = PackageManifest {
            packages: vec![Package::without_files("pip-thing", "1.0")],
        };
        let err = verify("/bin/sh", &manifest, "gcr.io/builder").unwrap_err();
        match err {
            ValidationError::EntrypointNotFound { image, entrypoint } => {
                assert_eq!(image, "gcr.io/builder");
                assert_eq!(entrypoint, "/bin/sh");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
