//! Projection of the resolved symbol table into the two generated build
//! files: the CMake settings file and the cross-toolchain descriptor. Both
//! are rewritten in full on every invocation.

use std::io::Write;
use std::path::Path;

use kconfig::{Config, SymbolKind};

use crate::{BANNER, BuildError, write_atomic};

/// Generated settings file, relative to the project root.
pub const SETTINGS_FILE: &str = "config/RibbonDFConfig.cmake";
/// Generated toolchain descriptor, relative to the project root.
pub const TOOLCHAIN_FILE: &str = "build/toolchain.cmake";

/// Regenerates both artifacts from the resolved configuration.
pub fn emit(project: &Path, config: &Config) -> Result<(), BuildError> {
    write_settings(project, config)?;
    write_toolchain(project, config)
}

/// One `set(CONFIG_<NAME> <value>)` line per symbol, in engine iteration
/// order, followed by a `PROJECT_DEFINES` line collecting the matching
/// preprocessor define for every symbol in the same order.
pub fn write_settings(project: &Path, config: &Config) -> Result<(), BuildError> {
    let path = project.join(SETTINGS_FILE);
    log::info!("writing {}", path.display());
    write_atomic(&path, |w| {
        w.write_all(BANNER.as_bytes())?;
        let mut defines = Vec::new();
        for sym in config.symbols() {
            match sym.kind {
                SymbolKind::Bool => {
                    let on = sym.enabled();
                    writeln!(w, "set(CONFIG_{} {})", sym.name, if on { "on" } else { "off" })?;
                    defines.push(format!("-DCONFIG_{}={}", sym.name, if on { 1 } else { 0 }));
                }
                SymbolKind::String => {
                    writeln!(w, "set(CONFIG_{} \"{}\")", sym.name, sym.value)?;
                    defines.push(format!("-DCONFIG_{}=\"{}\"", sym.name, sym.value));
                }
                SymbolKind::Int => {
                    writeln!(w, "set(CONFIG_{} {})", sym.name, sym.value)?;
                    defines.push(format!("-DCONFIG_{}={}", sym.name, sym.value));
                }
            }
        }
        writeln!(w, "set(PROJECT_DEFINES {})", defines.join(" "))?;
        Ok(())
    })
}

/// Well-known settings the toolchain descriptor is rendered from, gathered
/// in one pass over the resolved symbols.
#[derive(Debug)]
pub struct ToolchainSettings {
    pub system_name: String,
    pub system_processor: String,
    pub prefix: String,
    pub c_compiler: String,
    pub cxx_compiler: String,
    pub asm_compiler: String,
    // read alongside the rest, not rendered into the descriptor yet
    pub c_flags: String,
    pub cxx_flags: String,
    pub debug: bool,
    pub version: String,
}

impl ToolchainSettings {
    /// Fails with the missing name if the project-level schema did not
    /// define one of the six required symbols. No fallback values.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let required = |name: &str| -> Result<String, BuildError> {
            config
                .lookup(name)
                .map(|sym| sym.value.clone())
                .ok_or_else(|| BuildError::MissingSetting {
                    name: name.to_string(),
                })
        };
        let optional = |name: &str| {
            config
                .lookup(name)
                .map(|sym| sym.value.clone())
                .unwrap_or_default()
        };
        Ok(Self {
            system_name: required("SYSTEM_NAME")?,
            system_processor: required("SYSTEM_PROCESSOR")?,
            prefix: required("TOOL_CHAIN_PREFIX")?,
            c_compiler: required("C_COMPILER")?,
            cxx_compiler: required("CXX_COMPILER")?,
            asm_compiler: required("ASM_COMPILER")?,
            c_flags: optional("C_FLAGS"),
            cxx_flags: optional("CXX_FLAGS"),
            debug: config.lookup("DEBUG").is_some_and(|sym| sym.enabled()),
            version: optional("VERSION"),
        })
    }
}

/// Renders the cross-compilation descriptor; the three compiler paths are
/// the toolchain prefix concatenated with the respective compiler symbol.
pub fn write_toolchain(project: &Path, config: &Config) -> Result<(), BuildError> {
    let settings = ToolchainSettings::from_config(config)?;
    log::debug!("toolchain settings: {settings:?}");
    let path = project.join(TOOLCHAIN_FILE);
    log::info!("writing {}", path.display());
    write_atomic(&path, |w| {
        w.write_all(BANNER.as_bytes())?;
        writeln!(w, "set(CMAKE_SYSTEM_NAME \"{}\")", settings.system_name)?;
        writeln!(
            w,
            "set(CMAKE_SYSTEM_PROCESSOR \"{}\")",
            settings.system_processor
        )?;
        writeln!(
            w,
            "set(CMAKE_C_COMPILER \"{}{}\")",
            settings.prefix, settings.c_compiler
        )?;
        writeln!(
            w,
            "set(CMAKE_CXX_COMPILER \"{}{}\")",
            settings.prefix, settings.cxx_compiler
        )?;
        writeln!(
            w,
            "set(CMAKE_ASM_COMPILER \"{}{}\")",
            settings.prefix, settings.asm_compiler
        )?;
        Ok(())
    })
}
