//! `freight-builder introspect` command

use anyhow::{Context, Result};

use super::resolve;
use crate::cli::IntrospectArgs;
use freight::ops::{introspect, IntrospectOptions};
use freight::{IntrospectOutcome, Manifest};

pub fn execute(args: IntrospectArgs, verbose: bool) -> Result<()> {
    let settings = resolve(&args.backend)?;

    let mut manifest = Manifest::load(&args.manifest)?;
    manifest.opts.verbose |= verbose;

    let opts = IntrospectOptions {
        backend: settings.backend,
        work_root: settings.work_root,
        timeout: settings.timeout,
        preflight: !args.backend.no_preflight,
    };

    let outcome = introspect(&manifest, &args.artifact, &opts)
        .with_context(|| format!("failed to introspect `{}`", args.artifact.display()))?;

    match outcome {
        IntrospectOutcome::UpToDate => println!("{}: up to date", args.artifact.display()),
        IntrospectOutcome::UpdatesAvailable => {
            println!("{}: updates available", args.artifact.display())
        }
    }

    Ok(())
}
