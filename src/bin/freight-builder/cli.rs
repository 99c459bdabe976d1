//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// freight-builder - package a set of RPMs as a container root filesystem
#[derive(Parser)]
#[command(name = "freight-builder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (also echoes external tool output)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the source and binary container packages for a manifest
    Build(BuildArgs),

    /// Check a built container package for pending updates
    Introspect(IntrospectArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that run the package manager.
#[derive(Args)]
pub struct BackendArgs {
    /// Package manager backend (yum, dnf)
    #[arg(long, env = "FREIGHT_BACKEND")]
    pub backend: Option<String>,

    /// Kill any external command running longer than this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory the temporary workspace is created in
    #[arg(long)]
    pub work_root: Option<PathBuf>,

    /// Skip checking that the required tools are installed
    #[arg(long)]
    pub no_preflight: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to the container manifest
    pub manifest: PathBuf,

    /// Directory receiving the built packages (overrides the manifest)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the workspace after a successful build
    #[arg(long)]
    pub keep_workspace: bool,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Args)]
pub struct IntrospectArgs {
    /// Path to the container manifest
    pub manifest: PathBuf,

    /// Container package to inspect
    pub artifact: PathBuf,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
