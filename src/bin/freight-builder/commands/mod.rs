//! Command implementations

pub mod build;
pub mod completions;
pub mod introspect;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::BackendArgs;
use freight::util::config::{global_config_path, load_config, project_config_path};
use freight::util::Config;
use freight::BackendId;

/// Backend settings after merging config files and command-line flags.
pub struct Resolved {
    pub config: Config,
    pub backend: BackendId,
    pub work_root: PathBuf,
    pub timeout: Option<Duration>,
}

/// Load configuration and apply flag overrides (CLI > project > global).
pub fn resolve(args: &BackendArgs) -> Result<Resolved> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));

    let backend = match args.backend {
        Some(ref b) => b
            .parse::<BackendId>()
            .map_err(|e| anyhow::anyhow!("invalid backend: {}", e))?,
        None => config.backend().unwrap_or_default(),
    };

    let work_root = args
        .work_root
        .clone()
        .or_else(|| config.build.work_root.clone())
        .unwrap_or(cwd);

    let timeout = args.timeout.map(Duration::from_secs).or(config.timeout());

    Ok(Resolved {
        config,
        backend,
        work_root,
        timeout,
    })
}
