// buildval-docker: Docker CLI collaborators for buildval.
// Acquires image metadata (`docker pull` + `docker inspect`) and package
// manifests (`docker sbom` in syft-json format) for the core validator.

pub mod docker;
pub mod syft;

pub use docker::{DockerCli, InspectionConfig, InspectionRecord};
pub use syft::decode_manifest;
