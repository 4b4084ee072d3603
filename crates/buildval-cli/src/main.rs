// Entry point for buildval, a static validator for container-build
// pipeline configuration files.
//
// Without executing any step, buildval checks that every step's effective
// entrypoint exists inside its container image and that the directory
// navigation implied by the steps is consistent across the pipeline.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use buildval_cli::config;
use buildval_cli::substitutions::{self, SubstitutionFlags};
use buildval_core::Interpreter;
use buildval_docker::DockerCli;

/// Command-line arguments for the validator.
#[derive(Parser, Debug)]
#[command(name = "buildval", about = "Static validator for container-build pipeline files")]
struct Args {
    /// Path to the pipeline configuration file.
    config: PathBuf,

    /// Project ID substituted for $PROJECT_ID (falls back to the
    /// PROJECT_ID environment variable).
    #[arg(long = "project")]
    project: Option<String>,

    /// Project number substituted for $PROJECT_NUMBER.
    #[arg(long = "project-number")]
    project_number: Option<String>,

    /// Repository name substituted for $REPO_NAME (falls back to the
    /// configuration file's directory name).
    #[arg(long = "repo-name")]
    repo_name: Option<String>,

    /// Branch name substituted for $BRANCH_NAME (falls back to a git
    /// query in the configuration file's directory).
    #[arg(long = "branch-name")]
    branch_name: Option<String>,

    /// Tag name substituted for $TAG_NAME.
    #[arg(long = "tag-name")]
    tag_name: Option<String>,
}

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    let exit_code = runtime.block_on(async move { run(args).await });

    std::process::exit(exit_code);
}

async fn run(args: Args) -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match validate(args).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Validation failed: {:#}", e);
            1
        }
    }
}

async fn validate(args: Args) -> Result<()> {
    let flags = SubstitutionFlags {
        project_id: args.project,
        project_number: args.project_number,
        repo_name: args.repo_name,
        branch_name: args.branch_name,
        tag_name: args.tag_name,
    };

    let macros = substitutions::build_substitutions(&flags, &args.config).await;
    tracing::info!("Substitutions: {:?}", macros);

    let config = config::read_config(&args.config)?;
    let mut steps = config.steps;
    tracing::info!("Validating {} step(s) from {}", steps.len(), args.config.display());

    // Generated manifest files land next to the configuration file and
    // persist after the run.
    let manifest_dir = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let docker = DockerCli::new(manifest_dir);

    let mut interpreter = Interpreter::new(macros);
    interpreter.run(&mut steps, &docker, &docker).await?;

    tracing::info!("Final directory state:\n{}", interpreter.render());
    Ok(())
}
