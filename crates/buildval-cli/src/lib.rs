// buildval-cli: command-line front end for buildval.
// Decodes the pipeline configuration, builds the macro table, and drives
// the core interpreter with the Docker collaborators.

pub mod config;
pub mod substitutions;

pub use config::{read_config, BuildConfig};
pub use substitutions::{build_substitutions, SubstitutionFlags};
