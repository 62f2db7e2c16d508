//! Turns a module descriptor into the shell command that builds it

use crate::{
    command::{CargoCommand, ShellScript},
    config::PluginSettings,
    error::{Error, Result},
    module::{ModuleDescriptor, RecipeContext},
    plugin::BuildOutcome,
    source::{Source, SourceFetcher, get_source_path, test_arch_applicable},
};
use std::path::Path;
use tracing::{debug, info};

pub struct ModuleResolver<F> {
    fetcher: F,
    settings: PluginSettings,
}

impl<F: SourceFetcher> ModuleResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_settings(fetcher, PluginSettings::default())
    }

    pub fn with_settings(fetcher: F, settings: PluginSettings) -> Self {
        Self { fetcher, settings }
    }

    #[cfg(test)]
    fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Parses both host documents and resolves the module for `target_arch`
    pub fn build_command(
        &self,
        module_json: &str,
        recipe_json: &str,
        target_arch: &str,
    ) -> Result<BuildOutcome> {
        let module = ModuleDescriptor::from_json(module_json)?;
        let recipe = RecipeContext::from_json(recipe_json)?;
        self.build_module(&module, &recipe, target_arch)
    }

    pub fn build_module(
        &self,
        module: &ModuleDescriptor,
        recipe: &RecipeContext,
        target_arch: &str,
    ) -> Result<BuildOutcome> {
        debug!("build_module called for {} on {}", module.name, target_arch);

        let sources = module.resolved_sources();
        if sources.is_empty() {
            return Err(Error::NoSourcesSpecified);
        }

        // Architecture is checked before anything is fetched
        if let Some(excluded) = sources
            .iter()
            .find(|src| !test_arch_applicable(&src.only_arches, target_arch))
        {
            info!(
                "skipping {}: source {} is limited to {:?}",
                module.name, excluded.url, excluded.only_arches
            );
            return Ok(BuildOutcome::Inapplicable);
        }

        self.fetch_sources(&sources, &module.name, recipe)?;

        let command = self.render_command(module, &sources[0]);
        debug!("generated command: {}", command);
        Ok(BuildOutcome::Command(command))
    }

    /// Downloads then moves each source in order, stopping at the first failure
    fn fetch_sources(
        &self,
        sources: &[Source],
        module_name: &str,
        recipe: &RecipeContext,
    ) -> Result<()> {
        let downloads = Path::new(&recipe.downloads_path);
        let sources_dir = Path::new(&recipe.sources_path);

        for source in sources {
            debug!("fetching {} for {}", source.url, module_name);
            self.fetcher
                .download_source(recipe, source, module_name)
                .map_err(Error::fetch_failed)?;
            self.fetcher
                .move_source(downloads, sources_dir, source, module_name)
                .map_err(Error::fetch_failed)?;
        }
        Ok(())
    }

    /// Assembles the build script; pure apart from reading settings
    pub fn render_command(&self, module: &ModuleDescriptor, primary: &Source) -> String {
        let work_dir = format!(
            "{}/{}",
            self.settings.work_root.trim_end_matches('/'),
            get_source_path(primary, &module.name)
        );
        let install_dir = module.effective_install_path(&self.settings);
        let installed = format!("{}/{}", install_dir.trim_end_matches('/'), module.name);

        let cargo = CargoCommand::build()
            .with_release(module.is_release())
            .with_features(&module.features)
            .with_no_default_features(module.no_default_features)
            .with_args(module.effective_build_flags(&self.settings));

        ShellScript::new()
            .cd(&work_dir)
            .step(self.settings.bootstrap.to_shell())
            .step(cargo.to_shell_command())
            .copy(&cargo.profile.binary_path(&module.name), &installed)
            .make_executable(&installed)
            .render()
    }
}
