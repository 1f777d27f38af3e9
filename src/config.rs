use crate::error::{GenError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

pub const INDEX_URL: &str = "https://fonts.google.com/metadata/icons";

pub const ASSET_URL_TEMPLATE: &str =
    "https://fonts.gstatic.com/s/i/{family}/{icon}/v{version}/24px.svg?download=true";

/// Prefix Google puts in front of the JSON index to prevent hijacking
pub const INDEX_PREFIX: &str = ")]}'\n";

const LEGACY_PREAMBLE: &str = "\
import Material.Icons.Coloring exposing (Coloring)
import Material.Icons.Internal exposing (icon)
import Svg exposing (Svg, circle, g, path, polygon, polyline, rect, use, svg)
import Svg.Attributes exposing (baseProfile, clipRule, cx, cy, d, enableBackground, fill, fillOpacity, fillRule, id, overflow, points, r, viewBox, xlinkHref)
";

const CURRENT_PREAMBLE: &str = "\
import Material.Icons.Internal exposing (icon, o, t)
import Material.Icons.Types exposing (Icon)
import Svg exposing (circle, g, path, polygon, polyline, rect, use)
import Svg.Attributes exposing (baseProfile, clipRule, cx, cy, d, enableBackground, fill, fillOpacity, fillRule, id, overflow, points, r, viewBox, xlinkHref)
";

const LEGACY_DENYLIST: &[&str] = &[
    "class",
    "clip-path",
    "display",
    "height",
    "version",
    "width",
    "x",
    "xml:space",
    "xmlns",
    "xmlns:xlink",
    "y",
];

const BASE_DIGIT_EXCEPTIONS: &[(&str, &str)] = &[
    ("360", "three_sixty"),
    ("3d_rotation", "three_d_rotation"),
    ("4k", "four_k"),
];

const EXTENDED_DIGIT_EXCEPTIONS: &[(&str, &str)] = &[
    ("10k", "ten_k"),
    ("10mp", "ten_mp"),
    ("1k", "one_k"),
    ("1k_plus", "one_k_plus"),
    ("1x_mobiledata", "one_x_mobiledata"),
    ("2k", "two_k"),
    ("2k_plus", "two_k_plus"),
    ("30fps", "thirty_fps"),
    ("30fps_select", "thirty_fps_select"),
    ("3g_mobiledata", "three_g_mobiledata"),
    ("3k", "three_k"),
    ("3k_plus", "three_k_plus"),
    ("3p", "three_p"),
    ("4g_mobiledata", "four_g_mobiledata"),
    ("4g_plus_mobiledata", "four_g_plus_mobiledata"),
    ("4k_plus", "four_k_plus"),
    ("5g", "five_g"),
    ("5k", "five_k"),
    ("5k_plus", "five_k_plus"),
    ("60fps", "sixty_fps"),
    ("60fps_select", "sixty_fps_select"),
    ("6_ft_apart", "six_ft_apart"),
    ("6k", "six_k"),
    ("6k_plus", "six_k_plus"),
    ("7k", "seven_k"),
    ("7k_plus", "seven_k_plus"),
    ("8k", "eight_k"),
    ("8k_plus", "eight_k_plus"),
    ("9k", "nine_k"),
    ("9k_plus", "nine_k_plus"),
];

/// Which generation of the generator to reproduce
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Profile {
    /// Coloring-based modules, one `@docs` line per icon
    Legacy,
    /// `Icon msg` modules with short attribute aliases and joined `@docs` lines
    Current,
}

/// How icons are listed under each documentation section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocLayout {
    OneLinePerSymbol,
    JoinedLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Keep,
    PurgeEachRun,
}

/// A regex rewrite applied to translator output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    pub pattern: String,
    pub replacement: String,
}

impl RenameRule {
    /// Rule matching `from` verbatim
    pub fn literal(from: &str, to: &str) -> Self {
        Self {
            pattern: regex::escape(from),
            replacement: to.replace('$', "$$"),
        }
    }

    /// Rule matching an attribute call `from "..."` and renaming the function
    pub fn attribute(from: &str, to: &str) -> Self {
        Self {
            pattern: format!(r#"(?m)(^|[\s\[]){}(\s+")"#, regex::escape(from)),
            replacement: format!("${{1}}{}${{2}}", to.replace('$', "$$")),
        }
    }
}

/// Repair policy for cached assets that fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries until the upstream serves valid content
    pub max_attempts: Option<u32>,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            delay: Duration::from_secs(5),
        }
    }
}

/// Directory layout of a generation run
#[derive(Debug, Clone)]
pub struct Paths {
    pub root: PathBuf,
    /// Downloaded source of truth: index and SVG cache
    pub cache_dir: PathBuf,
    /// Scratch output, purged every run
    pub out_dir: PathBuf,
    /// Permanent source tree the modules end up in
    pub src_dir: PathBuf,
}

impl Paths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache_dir: root.join("gen").join("tmp").join("sot"),
            out_dir: root.join("gen").join("tmp").join("out"),
            src_dir: root.join("src"),
            root,
        }
    }

    pub fn index_file(&self) -> PathBuf {
        self.cache_dir.join("icons.json")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.cache_dir.join("icons")
    }
}

/// Everything a run needs, built once at startup and shared by reference
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub paths: Paths,
    pub index_url: String,
    pub asset_url_template: String,
    /// Multi-word family prefix that becomes a module path (`Material Icons`)
    pub family_prefix: String,
    pub extension: String,
    pub attribute_denylist: Vec<String>,
    pub root_call: String,
    pub extra_renames: Vec<RenameRule>,
    pub indent: String,
    pub digit_exceptions: BTreeMap<String, String>,
    pub doc_layout: DocLayout,
    pub import_preamble: String,
    pub signature: String,
    pub cache_policy: CachePolicy,
    pub retry: RetryPolicy,
    /// Modules living next to the generated ones, relative to `src_dir`
    pub aux_dir: PathBuf,
    pub aux_modules: Vec<String>,
    /// Generated top-level directory replaced wholesale on install
    pub scaffold_dir: PathBuf,
    pub translator_program: PathBuf,
    pub formatter_program: PathBuf,
}

impl GeneratorConfig {
    pub fn for_profile(profile: Profile, root: impl Into<PathBuf>) -> Self {
        let mut digit_exceptions: BTreeMap<String, String> = BASE_DIGIT_EXCEPTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let legacy = profile == Profile::Legacy;

        if !legacy {
            digit_exceptions.extend(
                EXTENDED_DIGIT_EXCEPTIONS
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            );
        }

        let attribute_denylist = LEGACY_DENYLIST
            .iter()
            .filter(|attr| legacy || !matches!(**attr, "x" | "y"))
            .map(|attr| attr.to_string())
            .collect();

        let (aux_modules, extra_renames, import_preamble, signature) = if legacy {
            (
                vec!["Coloring.elm".to_string(), "Internal.elm".to_string()],
                Vec::new(),
                LEGACY_PREAMBLE,
                "Int -> Coloring -> Svg msg",
            )
        } else {
            (
                vec!["Types.elm".to_string(), "Internal.elm".to_string()],
                vec![
                    RenameRule::attribute("opacity", "o"),
                    RenameRule::attribute("transform", "t"),
                ],
                CURRENT_PREAMBLE,
                "Icon msg",
            )
        };

        Self {
            paths: Paths::from_root(root),
            index_url: INDEX_URL.to_string(),
            asset_url_template: ASSET_URL_TEMPLATE.to_string(),
            family_prefix: "Material Icons".to_string(),
            extension: "elm".to_string(),
            attribute_denylist,
            root_call: "icon".to_string(),
            extra_renames,
            indent: "    ".to_string(),
            digit_exceptions,
            doc_layout: if legacy {
                DocLayout::OneLinePerSymbol
            } else {
                DocLayout::JoinedLine
            },
            import_preamble: import_preamble.to_string(),
            signature: signature.to_string(),
            cache_policy: if legacy {
                CachePolicy::Keep
            } else {
                CachePolicy::PurgeEachRun
            },
            retry: RetryPolicy::default(),
            aux_dir: PathBuf::from("Material").join("Icons"),
            aux_modules,
            scaffold_dir: PathBuf::from("Material"),
            translator_program: PathBuf::from("./node_modules/.bin/html-elm"),
            formatter_program: PathBuf::from("elm-format"),
        }
    }

    /// Download URL for one icon asset
    pub fn asset_url(&self, family: &str, name: &str, version: u32) -> String {
        let family = family.to_lowercase().replace(' ', "");
        self.asset_url_template
            .replace("{family}", &family)
            .replace("{icon}", name)
            .replace("{version}", &version.to_string())
    }
}

/// Find the enclosing git checkout
pub fn resolve_project_root(start: &Path) -> Result<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(start)
        .output()
        .map_err(|e| GenError::ProjectRoot(e.to_string()))?;

    if !output.status.success() {
        return Err(GenError::ProjectRoot(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() {
        return Err(GenError::ProjectRoot("git returned an empty path".to_string()));
    }

    Ok(PathBuf::from(root))
}
