// Wraps the Docker CLI invocations used to acquire image metadata and
// per-image package manifests. Each call blocks until the child process
// exits; there is no timeout or cancellation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

use buildval_core::{
    ImageInspector, ImageMetadata, ManifestProvider, PackageManifest, ValidationError,
};

use crate::syft;

/// Raw `docker inspect` record (only the fields the validator consumes).
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionRecord {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Config", default)]
    pub config: InspectionConfig,
}

/// The `Config` block of an inspection record. Docker emits `null` for
/// absent entrypoint/cmd lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionConfig {
    #[serde(rename = "Entrypoint", default)]
    pub entrypoint: Option<Vec<String>>,
    #[serde(rename = "Cmd", default)]
    pub cmd: Option<Vec<String>>,
}

/// Docker CLI collaborator: pull, inspect, and manifest generation.
pub struct DockerCli {
    docker_path: String,
    /// Directory receiving one generated manifest file per distinct image.
    /// The files persist after the run.
    manifest_dir: PathBuf,
}

impl DockerCli {
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            docker_path: "docker".to_string(),
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Use a custom Docker binary path.
    pub fn with_path(docker_path: impl Into<String>, manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            docker_path: docker_path.into(),
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Pull an image so that inspection and manifest generation can run
    /// against local metadata.
    pub async fn pull_image(&self, image: &str) -> Result<()> {
        tracing::info!(target: "docker", "Pulling {}", image);
        self.run_docker(&["pull", image])
            .await
            .with_context(|| format!("Unable to ensure {image}"))?;
        Ok(())
    }

    /// Inspect an image and decode its declared entrypoint/cmd lists.
    pub async fn inspect_image(&self, image: &str) -> Result<ImageMetadata> {
        tracing::info!(target: "docker", "Inspecting {}", image);
        let output = self
            .run_docker(&["inspect", image])
            .await
            .with_context(|| format!("Unable to inspect {image}"))?;
        decode_inspection(image, &output)
    }

    /// Generate a syft-json manifest file for `image` under the manifest
    /// directory and return its path.
    pub async fn generate_manifest(&self, image: &str) -> Result<PathBuf> {
        tracing::info!(target: "docker", "Compiling package manifest for {}", image);
        let file_name = format!("{}.json", image.replace(['/', ':'], "_"));
        let path = self.manifest_dir.join(file_name);
        let path_arg = path.to_string_lossy().into_owned();
        self.run_docker(&["sbom", image, "--format", "syft-json", "-o", &path_arg])
            .await
            .with_context(|| format!("Unable to fetch package manifest for {image}"))?;
        Ok(path)
    }

    /// Run a Docker CLI command and return its stdout.
    async fn run_docker(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(target: "docker", "Running: {} {}", self.docker_path, args.join(" "));
        let output = tokio::process::Command::new(&self.docker_path)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to start {} {}", self.docker_path, args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Docker command exited with code {}: {} {}\n{}",
                output.status.code().unwrap_or(-1),
                self.docker_path,
                args.join(" "),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Decode `docker inspect` output, requiring exactly one record.
fn decode_inspection(image: &str, output: &str) -> Result<ImageMetadata> {
    let records: Vec<InspectionRecord> = serde_json::from_str(output)
        .with_context(|| format!("Failed to decode inspection output for {image}"))?;

    if records.len() != 1 {
        return Err(ValidationError::MalformedMetadata {
            image: image.to_string(),
            count: records.len(),
        }
        .into());
    }

    let config = records.into_iter().next().map(|r| r.config).unwrap_or_default();
    Ok(ImageMetadata {
        entrypoint: config.entrypoint.unwrap_or_default(),
        cmd: config.cmd.unwrap_or_default(),
    })
}

#[async_trait]
impl ImageInspector for DockerCli {
    async fn inspect(&self, image: &str) -> Result<ImageMetadata> {
        self.pull_image(image).await?;
        self.inspect_image(image).await
    }
}

#[async_trait]
impl ManifestProvider for DockerCli {
    async fn manifest(&self, image: &str) -> Result<PackageManifest> {
        let path = self.generate_manifest(image).await?;
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Unable to open manifest file {}", path.display()))?;
        syft::decode_manifest(std::io::BufReader::new(file))
            .with_context(|| format!("Unable to decode manifest for {image}"))
    }
}
