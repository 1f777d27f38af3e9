use crate::config::{GeneratorConfig, RenameRule};
use crate::error::{GenError, Result};
use regex::Regex;
use std::path::PathBuf;
use std::process::Command;

/// Turns canonical SVG markup into Elm source
pub trait Translator {
    fn translate(&self, markup: &str) -> Result<String>;
}

/// Runs an external translator (`html-elm`) with the markup as its argument
pub struct CommandTranslator {
    program: PathBuf,
}

impl CommandTranslator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Translator for CommandTranslator {
    fn translate(&self, markup: &str) -> Result<String> {
        let tool = self.program.display().to_string();

        let output = Command::new(&self.program)
            .arg(markup)
            .output()
            .map_err(|e| GenError::tool(&tool, e.to_string()))?;

        if !output.status.success() {
            return Err(GenError::tool(
                &tool,
                format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| GenError::tool(&tool, e.to_string()))
    }
}

/// Renames applied to every translator output, in order
fn base_rules(root_call: &str) -> Vec<RenameRule> {
    vec![
        RenameRule {
            pattern: "(?m)^svg".to_string(),
            replacement: root_call.replace('$', "$$"),
        },
        RenameRule::literal("baseprofile", "baseProfile"),
        RenameRule::literal("clip-rule", "clipRule"),
        RenameRule::literal("clippath", "Svg.clipPath"),
        RenameRule::literal("enable-background", "enableBackground"),
        RenameRule::literal("fill-opacity", "fillOpacity"),
        RenameRule::literal("fill-rule", "fillRule"),
        RenameRule::literal("viewbox", "viewBox"),
        RenameRule::literal("xlink:href", "xlinkHref"),
    ]
}

/// Post-processes translator output into a function body for the module
pub struct TranslatorAdapter<'a> {
    translator: &'a dyn Translator,
    rules: Vec<(Regex, String)>,
    indent: String,
}

impl<'a> TranslatorAdapter<'a> {
    pub fn new(config: &GeneratorConfig, translator: &'a dyn Translator) -> Result<Self> {
        let rules = base_rules(&config.root_call)
            .iter()
            .chain(&config.extra_renames)
            .map(|rule| -> Result<(Regex, String)> {
                Ok((Regex::new(&rule.pattern)?, rule.replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            translator,
            rules,
            indent: config.indent.clone(),
        })
    }

    pub fn translate(&self, markup: &str) -> Result<String> {
        let code = self.translator.translate(markup)?;
        Ok(self.rewrite(&code))
    }

    /// Apply the rename table and indent continuation lines
    pub fn rewrite(&self, code: &str) -> String {
        let renamed = self.rules.iter().fold(code.to_string(), |acc, (re, to)| {
            re.replace_all(&acc, to.as_str()).into_owned()
        });

        renamed
            .replace('\n', &format!("\n{}", self.indent))
            .trim()
            .to_string()
    }
}
