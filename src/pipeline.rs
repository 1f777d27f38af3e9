use crate::config::{CachePolicy, GeneratorConfig};
use crate::error::{GenError, Result};
use crate::icon_cache::{Fetcher, IconCache, Sleeper};
use crate::install::{install, remove_dir_if_exists, Formatter};
use crate::manifest::{build_categories, load_index, Index};
use crate::module_builder::{FamilyReport, ModuleBuilder};
use crate::svg_normalizer::Normalizer;
use crate::translator::{Translator, TranslatorAdapter};
use std::time::Instant;
use tracing::{debug, info};

/// Summary of a completed run
#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
    pub families: Vec<FamilyReport>,
    pub installed: usize,
    pub duration_ms: u64,
}

impl GenerationStats {
    pub fn icons(&self) -> usize {
        self.families.iter().map(|f| f.icons).sum()
    }
}

/// The external collaborators of a run
pub struct Pipeline<'a> {
    config: &'a GeneratorConfig,
    fetcher: &'a dyn Fetcher,
    translator: &'a dyn Translator,
    formatter: &'a dyn Formatter,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        fetcher: &'a dyn Fetcher,
        translator: &'a dyn Translator,
        formatter: &'a dyn Formatter,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            config,
            fetcher,
            translator,
            formatter,
            sleeper,
        }
    }

    /// Generate, install and format every family module
    pub fn run(&self) -> Result<GenerationStats> {
        let start = Instant::now();
        let config = self.config;

        // Setup
        self.prepare_dirs()?;
        let index = self.download_index()?;
        let categories = build_categories(&index.icons);

        info!(
            icons = index.icons.len(),
            families = index.families.len(),
            categories = categories.len(),
            "loaded icon index"
        );

        // Generate
        let normalizer = Normalizer::new(&config.attribute_denylist)?;
        let adapter = TranslatorAdapter::new(config, self.translator)?;
        let cache = IconCache::new(config, self.fetcher, self.sleeper);
        let builder = ModuleBuilder::new(config, &cache, &normalizer, &adapter);

        let families = index
            .families
            .iter()
            .map(|family| -> Result<FamilyReport> {
                let report = builder.assemble(family, &index, &categories)?;
                debug!(path = %report.path.display(), "module written");
                Ok(report)
            })
            .collect::<Result<Vec<_>>>()?;

        // Move
        let installed = install(config)?;

        // Format
        info!(dir = %config.paths.src_dir.display(), "formatting sources");
        self.formatter.format(&config.paths.src_dir)?;

        Ok(GenerationStats {
            families,
            installed,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn prepare_dirs(&self) -> Result<()> {
        let paths = &self.config.paths;

        if self.config.cache_policy == CachePolicy::PurgeEachRun {
            remove_dir_if_exists(&paths.cache_dir)?;
        }
        let icons_dir = paths.icons_dir();
        std::fs::create_dir_all(&icons_dir).map_err(|e| GenError::io(&icons_dir, e))?;

        remove_dir_if_exists(&paths.out_dir)?;
        std::fs::create_dir_all(&paths.out_dir).map_err(|e| GenError::io(&paths.out_dir, e))
    }

    /// Download the index to the cache directory and parse it
    fn download_index(&self) -> Result<Index> {
        let path = self.config.paths.index_file();
        info!(url = %self.config.index_url, "downloading icon index");

        let bytes = self.fetcher.fetch(&self.config.index_url)?;
        std::fs::write(&path, &bytes).map_err(|e| GenError::io(&path, e))?;

        load_index(&bytes)
    }
}
