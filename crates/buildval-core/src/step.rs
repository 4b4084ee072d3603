// Step input model.
// One declared unit of pipeline work, as decoded from the configuration
// file by the CLI crate.

use serde::Deserialize;

/// One step of a declarative container-build pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Container image reference.
    pub name: String,

    /// Step identifier, used in diagnostics when present.
    #[serde(default)]
    pub id: String,

    /// Explicit entrypoint override.
    #[serde(default)]
    pub entrypoint: Option<String>,

    /// Arguments passed to the entrypoint.
    #[serde(default)]
    pub args: Vec<String>,

    /// Declared working directory, relative to the workspace by convention.
    #[serde(default)]
    pub dir: Option<String>,

    /// Effective entrypoint, populated during metadata acquisition.
    #[serde(skip)]
    pub resolved_cmd: Option<String>,
}

impl Step {
    /// Create a step for the given image with no override, args, or dir.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            name: image.into(),
            id: String::new(),
            entrypoint: None,
            args: Vec::new(),
            dir: None,
            resolved_cmd: None,
        }
    }

    pub fn with_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.entrypoint = Some(entrypoint.into());
        self
    }

    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// The step's id when declared, otherwise its image reference.
    pub fn label(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_id() {
        let mut step = Step::new("gcr.io/builder");
        assert_eq!(step.label(), "gcr.io/builder");
        step.id = "compile".to_string();
        assert_eq!(step.label(), "compile");
    }
}
