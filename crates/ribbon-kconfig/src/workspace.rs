use std::fs;
use std::path::Path;

use crate::BuildError;

pub const SUBDIRS: [&str; 3] = ["build", "config", "install"];

/// Deletes and recreates the build/config/install triad under `project`.
/// Sequential and non-transactional: the first failure propagates and leaves
/// the earlier steps done.
pub fn distclean(project: &Path) -> Result<(), BuildError> {
    log::info!("resetting workspace at {}", project.display());
    for dir in SUBDIRS {
        let path = project.join(dir);
        fs::remove_dir_all(&path).map_err(|source| BuildError::io(&path, source))?;
    }
    for dir in SUBDIRS {
        let path = project.join(dir);
        fs::create_dir(&path).map_err(|source| BuildError::io(&path, source))?;
    }
    Ok(())
}
