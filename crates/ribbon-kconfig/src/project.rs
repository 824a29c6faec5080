use std::fs;
use std::path::{Path, PathBuf};

use kconfig::Config;
use menuconfig::term;

use crate::{BuildError, artifacts, tree};

/// Persisted selection file, relative to the project root. Owned by the
/// engine; this tool only decides when to load and write it.
pub const SELECTION_FILE: &str = "config/.config";

/// Assembles the configuration tree, then runs first-load initialization.
pub fn project_init(project: &Path, components: &[PathBuf]) -> Result<(), BuildError> {
    tree::generate(project, components)?;
    first_load(project)
}

/// Ensures `config/` exists; on the first run (no selection file yet)
/// evaluates the tree with engine defaults, persists them and emits both
/// artifacts. With a selection file present the call changes nothing — it
/// does not recreate deleted artifacts.
pub fn first_load(project: &Path) -> Result<(), BuildError> {
    let config_dir = project.join("config");
    if !config_dir.exists() {
        fs::create_dir(&config_dir).map_err(|source| BuildError::io(&config_dir, source))?;
    }
    let selections = project.join(SELECTION_FILE);
    if selections.exists() {
        log::trace!("{} already present, nothing to do", selections.display());
        return Ok(());
    }
    let config = Config::load_tree(project.join(tree::GENERATED_TREE))?;
    config.write_config(&selections)?;
    artifacts::emit(project, &config)
}

/// Loads the tree plus any prior selections, hands the terminal to the
/// interactive menu until the user exits, then persists the selections and
/// regenerates both artifacts.
pub fn menuconfig(project: &Path) -> Result<(), BuildError> {
    let mut config = Config::load_tree(project.join(tree::GENERATED_TREE))?;
    let selections = project.join(SELECTION_FILE);
    if selections.exists() {
        config.load_config(&selections)?;
    }
    term::run(&mut config).map_err(|err| BuildError::Menu(err.to_string()))?;
    config.write_config(&selections)?;
    artifacts::emit(project, &config)
}
