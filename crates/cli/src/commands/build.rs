use anyhow::{Context, Result};
use std::fs;
use tracing::{debug, info};
use vib_cargo_core::{
    BuildOutcome, DryRunFetcher, FsSourceFetcher, ModuleResolver, PluginSettings, SourceFetcher,
    wire_result,
};

use crate::cli::BuildArgs;

pub fn build_command(args: &BuildArgs) -> Result<i32> {
    let result = render_build(args)?;
    let failed = result.is_err();
    if let Ok(BuildOutcome::Inapplicable) = &result {
        info!("module does not apply to {}", args.arch);
    }

    println!("{}", wire_result(result));
    Ok(if failed { 1 } else { 0 })
}

/// Reads the input files and runs the resolver; the inner result is the
/// plugin outcome, the outer one covers local file problems
pub fn render_build(args: &BuildArgs) -> Result<vib_cargo_core::Result<BuildOutcome>> {
    let module_json = fs::read_to_string(&args.module)
        .with_context(|| format!("Failed to read module file {}", args.module.display()))?;
    let recipe_json = match &args.recipe {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file {}", path.display()))?,
        None => "{}".to_string(),
    };
    let settings = match &args.config {
        Some(path) => PluginSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => PluginSettings::default(),
    };
    debug!("Using settings: {:?}", settings);

    let outcome = if args.no_fetch {
        run(DryRunFetcher, settings, &module_json, &recipe_json, &args.arch)
    } else {
        run(FsSourceFetcher, settings, &module_json, &recipe_json, &args.arch)
    };
    Ok(outcome)
}

fn run<F: SourceFetcher>(
    fetcher: F,
    settings: PluginSettings,
    module_json: &str,
    recipe_json: &str,
    arch: &str,
) -> vib_cargo_core::Result<BuildOutcome> {
    ModuleResolver::with_settings(fetcher, settings).build_command(module_json, recipe_json, arch)
}
