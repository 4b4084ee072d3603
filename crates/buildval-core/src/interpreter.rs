// Step interpretation driver.
// Two-phase orchestration over the step list, in declaration order:
//   phase 1 - macro substitution, per-image metadata/manifest acquisition
//             (at most once per distinct image), entrypoint resolution and
//             verification;
//   phase 2 - declared working-directory and shell-command simulation
//             against the shared virtual filesystem, so later steps
//             observe directory state left by earlier ones.
// Any failure in either phase aborts the whole run.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::entrypoint;
use crate::error::{PathError, ValidationError};
use crate::manifest::{ImageMetadata, PackageManifest};
use crate::path_tree::VirtualFs;
use crate::shell::ShellInterpreter;
use crate::step::Step;

/// Acquires declared entrypoint/cmd lists for an image.
#[async_trait]
pub trait ImageInspector: Send + Sync {
    async fn inspect(&self, image: &str) -> anyhow::Result<ImageMetadata>;
}

/// Acquires the decoded package manifest for an image.
#[async_trait]
pub trait ManifestProvider: Send + Sync {
    async fn manifest(&self, image: &str) -> anyhow::Result<PackageManifest>;
}

/// Per-image acquisition results, fetched at most once per run.
#[derive(Debug, Clone)]
struct ImageData {
    metadata: ImageMetadata,
    manifest: PackageManifest,
}

/// Abstract-interpretation state for one validation run.
pub struct Interpreter {
    fs: VirtualFs,
    image_cache: HashMap<String, ImageData>,
    macros: HashMap<String, String>,
    shell: ShellInterpreter,
}

impl Interpreter {
    /// Create a fresh interpreter with the run's fixed macro table.
    pub fn new(macros: HashMap<String, String>) -> Self {
        Self {
            fs: VirtualFs::new(),
            image_cache: HashMap::new(),
            macros,
            shell: ShellInterpreter::new(),
        }
    }

    /// Replace the shell interpreter (custom verb dispatch table).
    pub fn with_shell(mut self, shell: ShellInterpreter) -> Self {
        self.shell = shell;
        self
    }

    pub fn fs(&self) -> &VirtualFs {
        &self.fs
    }

    /// Diagnostic outline of the final directory tree.
    pub fn render(&self) -> String {
        self.fs.render()
    }

    /// Validate `steps` in declaration order. Phase 1 completes for all
    /// steps before phase 2 begins for any; the first failure anywhere
    /// aborts the run.
    pub async fn run(
        &mut self,
        steps: &mut [Step],
        inspector: &dyn ImageInspector,
        manifests: &dyn ManifestProvider,
    ) -> Result<(), ValidationError> {
        for step in steps.iter_mut() {
            self.substitute(step);
            self.ensure_image(&step.name, inspector, manifests).await?;

            let data = &self.image_cache[&step.name];
            let effective = entrypoint::resolve(step.entrypoint.as_deref(), &data.metadata, &step.name)?;
            entrypoint::verify(&effective, &data.manifest, &step.name)?;
            tracing::info!("Verified entrypoint '{}' for step '{}'", effective, step.label());
            step.resolved_cmd = Some(effective);
        }

        for step in steps.iter() {
            self.simulate(step)?;
        }
        Ok(())
    }

    /// Replace every recognized macro token across the step's string
    /// fields. Unmatched tokens in the text remain untouched.
    fn substitute(&self, step: &mut Step) {
        let name = self.replace(&step.name);
        if name != step.name {
            tracing::debug!("Replacing {} with {}", step.name, name);
        }
        step.name = name;

        if let Some(ep) = step.entrypoint.take() {
            step.entrypoint = Some(self.replace(&ep));
        }
        for arg in &mut step.args {
            *arg = self.replace(arg);
        }
        if let Some(dir) = step.dir.take() {
            step.dir = Some(self.replace(&dir));
        }
    }

    fn replace(&self, input: &str) -> String {
        let mut result = input.to_string();
        for (token, value) in &self.macros {
            result = result.replace(token, value);
        }
        result
    }

    /// Acquire metadata and manifest for `image`, at most once per run
    /// regardless of how many steps reference it.
    async fn ensure_image(
        &mut self,
        image: &str,
        inspector: &dyn ImageInspector,
        manifests: &dyn ManifestProvider,
    ) -> Result<(), ValidationError> {
        if self.image_cache.contains_key(image) {
            return Ok(());
        }

        tracing::info!("Inspecting {}", image);
        let metadata =
            inspector
                .inspect(image)
                .await
                .map_err(|source| ValidationError::Inspect {
                    image: image.to_string(),
                    source,
                })?;

        tracing::info!("Acquiring package manifest for {}", image);
        let manifest =
            manifests
                .manifest(image)
                .await
                .map_err(|source| ValidationError::Manifest {
                    image: image.to_string(),
                    source,
                })?;

        self.image_cache
            .insert(image.to_string(), ImageData { metadata, manifest });
        Ok(())
    }

    /// Simulate one step: declared working directory first, then the
    /// directory commands extracted from its arguments.
    fn simulate(&mut self, step: &Step) -> Result<(), ValidationError> {
        if let Some(dir) = step.dir.as_deref().filter(|d| !d.is_empty()) {
            self.enter_declared_dir(dir)
                .map_err(|source| ValidationError::Path {
                    step: step.label().to_string(),
                    source,
                })?;
            tracing::debug!("Step '{}' working directory: {}", step.label(), self.fs.cwd_path());
        }

        let effective = step.resolved_cmd.as_deref().unwrap_or_default();
        let ops = self.shell.parse(effective, &step.args);
        self.shell
            .apply(&ops, &mut self.fs)
            .map_err(|source| ValidationError::Path {
                step: step.label().to_string(),
                source,
            })
    }

    /// Walk the cursor into a step's declared working directory, creating
    /// missing directories on the way.
    ///
    /// Policy: a path that is not absolute and not `.`/`..`-qualified
    /// re-bases to the workspace directory before walking; absolute paths
    /// walk from the root; dot-qualified paths resolve against the
    /// current position.
    fn enter_declared_dir(&mut self, dir: &str) -> Result<(), PathError> {
        let segments: Vec<&str> = dir.split('/').collect();
        let mut start = 0;
        match segments[0] {
            "" => {
                self.fs.reset_to_root();
                start = 1;
            }
            "." => start = 1,
            ".." => {}
            _ => self.fs.reset_to_workspace(),
        }

        for segment in &segments[start..] {
            match *segment {
                "" | "." => {}
                ".." => self.fs.navigate("..")?,
                name => {
                    self.fs.make_directory(name, false)?;
                    self.fs.navigate(name)?;
                }
            }
        }
        Ok(())
    }
}
