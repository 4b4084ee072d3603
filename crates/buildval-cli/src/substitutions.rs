// Builds the macro substitution table for a run from command-line flags,
// the environment, and version-control queries, in that precedence order.
// The core treats the result as an opaque token → value mapping.

use std::collections::HashMap;
use std::path::Path;

/// Substitution values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct SubstitutionFlags {
    pub project_id: Option<String>,
    pub project_number: Option<String>,
    pub repo_name: Option<String>,
    pub branch_name: Option<String>,
    pub tag_name: Option<String>,
}

/// Build the macro table. `config_path` points at the pipeline file; its
/// directory supplies the repo-name fallback and hosts the git queries.
pub async fn build_substitutions(
    flags: &SubstitutionFlags,
    config_path: &Path,
) -> HashMap<String, String> {
    let dir = config_path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));

    let mut table = HashMap::new();

    match non_empty(&flags.project_id) {
        Some(project) => {
            table.insert("$PROJECT_ID".to_string(), project);
        }
        None => {
            if let Ok(project) = std::env::var("PROJECT_ID") {
                if !project.is_empty() {
                    table.insert("$PROJECT_ID".to_string(), project);
                }
            }
        }
    }

    if let Some(number) = non_empty(&flags.project_number) {
        table.insert("$PROJECT_NUMBER".to_string(), number);
    }

    let repo = non_empty(&flags.repo_name).or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
    });
    if let Some(repo) = repo {
        table.insert("$REPO_NAME".to_string(), repo);
    }

    let branch = match non_empty(&flags.branch_name) {
        Some(branch) => Some(branch),
        None => git_output(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).await,
    };
    match branch {
        Some(branch) => {
            table.insert("$BRANCH_NAME".to_string(), branch);
        }
        None => tracing::warn!("Unable to determine branch name; $BRANCH_NAME left unset"),
    }

    if let Some(tag) = non_empty(&flags.tag_name) {
        table.insert("$TAG_NAME".to_string(), tag);
    }

    if let Some(commit) = git_output(dir, &["rev-parse", "HEAD"]).await {
        let short = commit.chars().take(7).collect::<String>();
        table.insert("$COMMIT".to_string(), commit);
        table.insert("$SHORT_SHA".to_string(), short);
    }

    table
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Run a git query in `dir`, returning trimmed stdout on success.
async fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
