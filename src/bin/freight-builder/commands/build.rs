//! `freight-builder build` command

use anyhow::{Context, Result};

use super::resolve;
use crate::cli::BuildArgs;
use freight::ops::{build, BuildOptions};
use freight::Manifest;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let settings = resolve(&args.backend)?;

    let mut manifest = Manifest::load(&args.manifest)?;
    manifest.opts.verbose |= verbose;

    // Output directory: CLI > manifest > config
    if let Some(output) = args.output {
        manifest.opts.output_path = Some(output);
    } else if manifest.opts.output_path.is_none() {
        manifest.opts.output_path = settings.config.build.output_path.clone();
    }

    let opts = BuildOptions {
        backend: settings.backend,
        work_root: settings.work_root,
        timeout: settings.timeout,
        keep_workspace: args.keep_workspace,
        preflight: !args.backend.no_preflight,
    };

    let result = build(&manifest, &opts)
        .with_context(|| format!("failed to build `{}`", manifest.package.container_name()))?;

    eprintln!("    Finished source package {}", result.srpm.display());
    match result.rpm {
        Some(ref rpm) => eprintln!("    Finished binary package {}", rpm.display()),
        None => eprintln!("    Finished binary package in {}", result.rpm_dir.display()),
    }
    if let Some(ref ws) = result.workspace {
        eprintln!("        Kept workspace {}", ws.display());
    }

    Ok(())
}
