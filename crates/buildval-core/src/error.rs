// Error types for pipeline validation.
// Every error is fatal to the run: the driver stops at the first failure
// and reports it together with the step/image involved.

use thiserror::Error;

/// Failures raised by the virtual filesystem.
#[derive(Debug, Error)]
pub enum PathError {
    /// A navigation segment named a directory that does not exist.
    #[error("path not found: no directory '{segment}' while walking '{path}'")]
    NotFound { segment: String, path: String },

    /// Non-recursive creation hit a missing intermediate directory.
    #[error("cannot create '{path}': missing intermediate directory '{segment}'. Perhaps you didn't pass in -p?")]
    MissingParent { segment: String, path: String },

    /// A `..` segment was applied at the tree root.
    #[error("cannot walk above the root while resolving '{path}'")]
    AboveRoot { path: String },
}

/// Failures raised by the step interpretation driver.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The image metadata collaborator failed.
    #[error("unable to inspect image '{image}'")]
    Inspect {
        image: String,
        #[source]
        source: anyhow::Error,
    },

    /// The package manifest collaborator failed.
    #[error("unable to acquire package manifest for image '{image}'")]
    Manifest {
        image: String,
        #[source]
        source: anyhow::Error,
    },

    /// Image inspection produced a record count other than one.
    #[error("expected exactly 1 inspection record for image '{image}', got {count}")]
    MalformedMetadata { image: String, count: usize },

    /// No override, no declared entrypoint, and no declared command.
    #[error("no entrypoint or cmd found for image '{image}'")]
    MissingEntrypoint { image: String },

    /// The effective entrypoint is not an installed file of any package.
    #[error("entrypoint '{entrypoint}' not found in image '{image}'")]
    EntrypointNotFound { image: String, entrypoint: String },

    /// Directory simulation failed for a step.
    #[error("directory simulation failed for step '{step}'")]
    Path {
        step: String,
        #[source]
        source: PathError,
    },
}
