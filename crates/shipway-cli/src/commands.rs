//! CLI command definitions.

use clap::{Subcommand, ValueEnum};
use shipway_core::trigger::RefKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RefKindArg {
    Branch,
    Tag,
}

impl From<RefKindArg> for RefKind {
    fn from(arg: RefKindArg) -> Self {
        match arg {
            RefKindArg::Branch => RefKind::Branch,
            RefKindArg::Tag => RefKind::Tag,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the release pipeline for one trigger event
    Run {
        #[arg(long, default_value = "release.yml")]
        config: PathBuf,

        /// Kind of git ref the event refers to
        #[arg(long, value_enum)]
        ref_kind: RefKindArg,

        /// Name of the ref (tag or branch)
        #[arg(long)]
        ref_name: String,

        /// Replace registry uploads and docs pushes with no-op recorders
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate the release configuration and print the matrix expansion
    Validate {
        #[arg(long, default_value = "release.yml")]
        config: PathBuf,
    },
}
