// buildval-core: Abstract interpreter for container-build pipeline validation.
// Models the pipeline's directory structure in memory, simulates the
// directory commands each step would run, and verifies step entrypoints
// against per-image package manifests. Nothing is executed for real.
//
// Architecture:
//   Interpreter::run → phase 1 (substitute, acquire metadata + manifest,
//                               resolve + verify entrypoint, per step)
//                    → phase 2 (declared dir + shell simulation, per step)

pub mod entrypoint;
pub mod error;
pub mod interpreter;
pub mod manifest;
pub mod path_tree;
pub mod shell;
pub mod step;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use error::{PathError, ValidationError};
pub use interpreter::{ImageInspector, Interpreter, ManifestProvider};
pub use manifest::{ImageMetadata, Package, PackageManifest};
pub use path_tree::{NodeId, PathTree, VirtualFs, WORKSPACE_DIR};
pub use shell::{is_shell, CommandFn, ShellInterpreter, ShellOp};
pub use step::Step;
