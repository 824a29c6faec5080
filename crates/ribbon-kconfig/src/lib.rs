//! Build-time configuration driver for RibbonDF projects: assembles the
//! per-component Kconfig fragments into one tree, drives the interactive
//! menuconfig session, and emits the CMake artifacts the native build
//! consumes.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub mod artifacts;
mod error;
pub mod project;
pub mod tree;
pub mod workspace;

pub use error::BuildError;

// Every generated file opens with this marker.
pub(crate) const BANNER: &str =
    "#generated automatically by ribbon-kconfig, do not modify it manually\n";

/// Writes a generated file through a buffered writer, then renames it into
/// place over `path`.
pub(crate) fn write_atomic<F>(path: &Path, emit: F) -> Result<(), BuildError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut tmp_name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    let file = File::create(&tmp).map_err(|source| BuildError::io(&tmp, source))?;
    let mut writer = BufWriter::new(file);
    emit(&mut writer).map_err(|source| BuildError::io(&tmp, source))?;
    writer.flush().map_err(|source| BuildError::io(&tmp, source))?;
    fs::rename(&tmp, path).map_err(|source| BuildError::io(path, source))
}
