use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Formats the installed sources
pub trait Formatter {
    fn format(&self, dir: &Path) -> Result<()>;
}

/// Runs `elm-format <dir> --yes`
pub struct CommandFormatter {
    program: PathBuf,
    working_dir: PathBuf,
}

impl CommandFormatter {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, dir: &Path) -> Result<()> {
        let tool = self.program.display().to_string();

        let output = Command::new(&self.program)
            .arg(dir)
            .arg("--yes")
            .current_dir(&self.working_dir)
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

        Ok(())
    }
}

/// Move the generated modules into the source tree
///
/// Hand-written modules under the auxiliary directory are parked at the top of
/// the source tree while the generated scaffold is replaced, then put back.
/// Nothing is rolled back if a step fails.
pub fn install(config: &GeneratorConfig) -> Result<usize> {
    let paths = &config.paths;
    let aux_dir = paths.src_dir.join(&config.aux_dir);

    let mut parked = Vec::new();
    for module in &config.aux_modules {
        let from = aux_dir.join(module);
        let to = paths.src_dir.join(module);

        if from.exists() {
            rename(&from, &to)?;
            parked.push((to, from));
        } else {
            warn!(path = %from.display(), "auxiliary module not found, skipping");
        }
    }

    remove_dir_if_exists(&paths.src_dir.join(&config.scaffold_dir))?;

    let moved = move_tree(&paths.out_dir, &paths.src_dir)?;
    remove_dir_if_exists(&paths.out_dir)?;

    for (from, to) in parked {
        rename(&from, &to)?;
    }

    info!(modules = moved, dest = %paths.src_dir.display(), "installed generated modules");
    Ok(moved)
}

/// Move every file below `from` to the same relative location below `to`
fn move_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut moved = 0;

    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            GenError::io(path, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        rename(entry.path(), &to.join(relative))?;
        moved += 1;
    }

    Ok(moved)
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    debug!(from = %from.display(), to = %to.display(), "moving");

    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
    }
    std::fs::rename(from, to).map_err(|e| GenError::io(from, e))
}

pub(crate) fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Profile;
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    pub(crate) struct RecordingFormatter {
        pub(crate) dirs: RefCell<Vec<PathBuf>>,
    }

    impl Formatter for RecordingFormatter {
        fn format(&self, dir: &Path) -> Result<()> {
            self.dirs.borrow_mut().push(dir.to_path_buf());
            Ok(())
        }
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_install_replaces_scaffold_and_keeps_aux_modules() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::for_profile(Profile::Legacy, dir.path());
        let src = &config.paths.src_dir;
        let out = &config.paths.out_dir;

        write(&src.join("Material/Icons/Coloring.elm"), "coloring");
        write(&src.join("Material/Icons/Internal.elm"), "internal");
        write(&src.join("Material/Icons/Stale.elm"), "stale");
        write(&src.join("Material/Icons.elm"), "old");
        write(&src.join("Main.elm"), "main");

        write(&out.join("Material/Icons.elm"), "new");
        write(&out.join("Material/Icons/Outlined.elm"), "outlined");

        let moved = install(&config).unwrap();

        assert_eq!(moved, 2);
        assert_eq!(fs::read_to_string(src.join("Material/Icons.elm")).unwrap(), "new");
        assert_eq!(
            fs::read_to_string(src.join("Material/Icons/Outlined.elm")).unwrap(),
            "outlined"
        );
        assert_eq!(
            fs::read_to_string(src.join("Material/Icons/Coloring.elm")).unwrap(),
            "coloring"
        );
        assert_eq!(
            fs::read_to_string(src.join("Material/Icons/Internal.elm")).unwrap(),
            "internal"
        );
        assert_eq!(fs::read_to_string(src.join("Main.elm")).unwrap(), "main");
        assert!(!src.join("Material/Icons/Stale.elm").exists());
        assert!(!src.join("Coloring.elm").exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_install_skips_missing_aux_modules() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::for_profile(Profile::Current, dir.path());

        write(&config.paths.out_dir.join("Alpha.elm"), "alpha");

        assert_eq!(install(&config).unwrap(), 1);
        assert!(config.paths.src_dir.join("Alpha.elm").exists());
    }

    #[test]
    fn test_command_formatter_reports_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = CommandFormatter::new("/nonexistent/elm-format", dir.path());
        assert!(matches!(
            formatter.format(dir.path()),
            Err(GenError::Tool { .. })
        ));
    }
}
