use crate::config::{DocLayout, GeneratorConfig};
use crate::error::{GenError, Result};
use crate::icon_cache::IconCache;
use crate::manifest::{humanize, Category, Icon, Index};
use crate::svg_normalizer::Normalizer;
use crate::translator::TranslatorAdapter;
use std::collections::{BTreeMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of generating one family module
#[derive(Debug, Clone)]
pub struct FamilyReport {
    pub family: String,
    pub module_name: String,
    pub path: PathBuf,
    pub icons: usize,
}

/// Elm identifier for an icon (`"360"` -> `"three_sixty"`)
pub fn symbol_name(name: &str, exceptions: &BTreeMap<String, String>) -> Result<String> {
    if let Some(mapped) = exceptions.get(name) {
        return Ok(mapped.clone());
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(GenError::DataIntegrity {
            name: name.to_string(),
        });
    }

    Ok(name.to_string())
}

/// Module identifier for a family (`"Material Icons Two Tone"` -> `"Material.Icons.TwoTone"`)
pub fn module_name(family: &str, prefix: &str) -> String {
    collapse_family(family, prefix, ".")
}

/// Output path of a family module relative to the output root
pub fn module_path(family: &str, prefix: &str, extension: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}",
        collapse_family(family, prefix, "/"),
        extension
    ))
}

fn collapse_family(family: &str, prefix: &str, separator: &str) -> String {
    let expanded = family.replace(prefix, &prefix.replace(' ', separator));
    expanded.replacen(' ', separator, 1).replace(' ', "")
}

/// Writes one Elm module per family
pub struct ModuleBuilder<'a> {
    config: &'a GeneratorConfig,
    cache: &'a IconCache<'a>,
    normalizer: &'a Normalizer,
    adapter: &'a TranslatorAdapter<'a>,
}

impl<'a> ModuleBuilder<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        cache: &'a IconCache<'a>,
        normalizer: &'a Normalizer,
        adapter: &'a TranslatorAdapter<'a>,
    ) -> Self {
        Self {
            config,
            cache,
            normalizer,
            adapter,
        }
    }

    /// Generate the module for `family` under the output directory
    pub fn assemble(
        &self,
        family: &str,
        index: &Index,
        categories: &[Category],
    ) -> Result<FamilyReport> {
        let config = self.config;
        let module_name = module_name(family, &config.family_prefix);
        let out_path = config.paths.out_dir.join(module_path(
            family,
            &config.family_prefix,
            &config.extension,
        ));

        let supported: Vec<&Icon> = index.icons.iter().filter(|i| i.supports(family)).collect();
        let supported_names: HashSet<&str> = supported.iter().map(|i| i.name.as_str()).collect();

        info!(family, icons = supported.len(), "processing family");

        // Header
        let exposed = supported
            .iter()
            .map(|icon| symbol_name(&icon.name, &config.digit_exceptions))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        append_to_file(
            &out_path,
            &format!("module {module_name} exposing ({exposed})\n\n{{-|\n"),
        )?;

        // Docs
        for category in categories {
            append_to_file(&out_path, &format!("\n# {}\n\n", humanize(&category.name)))?;

            let mut icons: Vec<&Icon> = category
                .icons
                .iter()
                .filter(|icon| supported_names.contains(icon.name.as_str()))
                .collect();
            icons.sort_by(|a, b| a.name.cmp(&b.name));

            let symbols = icons
                .iter()
                .map(|icon| symbol_name(&icon.name, &config.digit_exceptions))
                .collect::<Result<Vec<_>>>()?;

            append_to_file(&out_path, &docs_block(&symbols, config.doc_layout))?;
        }

        // Imports
        append_to_file(&out_path, &format!("-}}\n\n{}", config.import_preamble))?;

        // Process each icon
        for icon in &supported {
            let symbol = symbol_name(&icon.name, &config.digit_exceptions)?;
            debug!("processing {family}/{symbol}");

            let svg = self.cache.confirm(family, icon, self.normalizer)?;
            let code = self.adapter.translate(&svg)?;

            append_to_file(&out_path, &function_block(&symbol, &config.signature, &code))?;
        }

        Ok(FamilyReport {
            family: family.to_string(),
            module_name,
            path: out_path,
            icons: supported.len(),
        })
    }
}

fn docs_block(symbols: &[String], layout: DocLayout) -> String {
    match layout {
        DocLayout::OneLinePerSymbol => symbols
            .iter()
            .map(|symbol| format!("@docs {symbol}\n"))
            .collect(),
        DocLayout::JoinedLine if symbols.is_empty() => String::new(),
        DocLayout::JoinedLine => format!("@docs {}\n", symbols.join(", ")),
    }
}

fn function_block(symbol: &str, signature: &str, code: &str) -> String {
    format!("\n\n{{-|-}}\n{symbol} : {signature}\n{symbol} =\n    {code}\n")
}

fn append_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| GenError::io(path, e))?;

    file.write_all(content.as_bytes())
        .map_err(|e| GenError::io(path, e))
}
