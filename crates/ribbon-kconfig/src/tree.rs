use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{BANNER, BuildError, write_atomic};

/// Generated schema tree, relative to the project root.
pub const GENERATED_TREE: &str = "build/Kconfig";

// Absolute path of the project-level schema shipped with the tool, baked in
// by build.rs.
const PROJECT_SCHEMA: &str = env!("PROJECT_KCONFIG");

/// Writes the root schema: the project-level menu first, then one menu per
/// component, in input order, wildcard-including the `Kconfig` files one
/// directory level below each component path. Nothing is checked here; a
/// missing or malformed fragment surfaces when the engine loads the tree.
pub fn generate(project: &Path, components: &[PathBuf]) -> Result<(), BuildError> {
    let path = project.join(GENERATED_TREE);
    log::info!("assembling configuration tree at {}", path.display());
    write_atomic(&path, |w| {
        w.write_all(BANNER.as_bytes())?;
        writeln!(w, "menu \"project Configuration\"")?;
        writeln!(w, "source \"{PROJECT_SCHEMA}\"")?;
        writeln!(w, "endmenu")?;
        for component in components {
            let name = component
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            writeln!(w, "menu \"{name} Configuration\"")?;
            writeln!(w, "osource \"{}/*/Kconfig\"", component.display())?;
            writeln!(w, "endmenu")?;
        }
        Ok(())
    })
}
