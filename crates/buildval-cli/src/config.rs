// Reads and decodes the declarative pipeline configuration file into the
// core step list.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use buildval_core::Step;

/// Decoded pipeline configuration: an ordered list of steps. Fields the
/// validator does not consume are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Read and decode the configuration file at `path`.
pub fn read_config(path: &Path) -> Result<BuildConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to open configuration file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Unable to decode YAML configuration {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_steps_with_defaults() {
        let yaml = r#"
steps:
  - name: gcr.io/$PROJECT_ID/builder
    id: compile
    entrypoint: /bin/sh
    args:
      - "-c"
      - "mkdir -p out\ncd out"
    dir: app
  - name: gcr.io/cloud-builders/docker
"#;
        let config: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.steps.len(), 2);

        let first = &config.steps[0];
        assert_eq!(first.name, "gcr.io/$PROJECT_ID/builder");
        assert_eq!(first.id, "compile");
        assert_eq!(first.entrypoint.as_deref(), Some("/bin/sh"));
        assert_eq!(first.args.len(), 2);
        assert_eq!(first.dir.as_deref(), Some("app"));

        let second = &config.steps[1];
        assert!(second.id.is_empty());
        assert!(second.entrypoint.is_none());
        assert!(second.args.is_empty());
        assert!(second.dir.is_none());
    }

    #[test]
    fn ignores_unconsumed_fields() {
        let yaml = r#"
steps:
  - name: gcr.io/cloud-builders/gcloud
    waitFor: ["-"]
    env:
      - FOO=bar
timeout: 1200s
"#;
        let config: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.steps.len(), 1);
    }

    #[test]
    fn empty_document_means_no_steps() {
        let config: BuildConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.steps.is_empty());
    }
}
