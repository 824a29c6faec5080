//! The `.config` selection file format: one `CONFIG_NAME=value` line per
//! symbol, disabled booleans written as `# CONFIG_NAME is not set`.

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::{Config, SymbolKind, parse, value_fits};

pub(crate) fn load(config: &mut Config, path: &Path) -> Result<(), Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("# CONFIG_") {
            if let Some(name) = rest.strip_suffix(" is not set") {
                if let Some(sym_idx) = config.symbol_index(name) {
                    let sym = config.symbol_mut(sym_idx);
                    if sym.kind == SymbolKind::Bool {
                        sym.value = "n".to_string();
                    }
                }
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::parse(path, line_no, "expected `CONFIG_NAME=value`"));
        };
        let Some(name) = key.strip_prefix("CONFIG_") else {
            return Err(Error::parse(path, line_no, format!("unexpected key `{key}`")));
        };
        // entries for symbols the tree no longer defines are stale, skip them
        let Some(sym_idx) = config.symbol_index(name) else {
            continue;
        };
        let kind = config.symbols()[sym_idx].kind;
        let canonical = match kind {
            SymbolKind::String => parse::unquote(value)
                .ok_or_else(|| {
                    Error::parse(path, line_no, format!("string value for `{name}` must be quoted"))
                })?
                .to_string(),
            _ => value.to_string(),
        };
        if !value_fits(kind, &canonical) {
            return Err(Error::parse(
                path,
                line_no,
                format!("invalid value `{value}` for {kind} symbol `{name}`"),
            ));
        }
        config.symbol_mut(sym_idx).value = canonical;
    }
    Ok(())
}

pub(crate) fn save(config: &Config, path: &Path) -> Result<(), Error> {
    let mut out =
        String::from("# generated automatically by the kconfig engine, do not modify it manually\n");
    for sym in config.symbols() {
        match sym.kind {
            SymbolKind::Bool => {
                if sym.enabled() {
                    out.push_str(&format!("CONFIG_{}=y\n", sym.name));
                } else {
                    out.push_str(&format!("# CONFIG_{} is not set\n", sym.name));
                }
            }
            SymbolKind::String => out.push_str(&format!("CONFIG_{}=\"{}\"\n", sym.name, sym.value)),
            SymbolKind::Int => out.push_str(&format!("CONFIG_{}={}\n", sym.name, sym.value)),
        }
    }
    fs::write(path, out).map_err(|source| Error::io(path, source))
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use std::fs;

    const SCHEMA: &str = "config DEBUG\n    bool \"Debug\"\n    default y\n\
                          config BOARD\n    string\n    default \"qemu\"\n\
                          config CORES\n    int\n    default 1\n";

    fn fixture() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("Kconfig");
        fs::write(&schema, SCHEMA).unwrap();
        let config = Config::load_tree(&schema).unwrap();
        (dir, config)
    }

    #[test]
    fn selections_survive_a_save_and_reload() {
        let (dir, mut config) = fixture();
        config.set_value("DEBUG", "n").unwrap();
        config.set_value("BOARD", "mps2-an385").unwrap();
        config.set_value("CORES", "4").unwrap();
        let saved = dir.path().join(".config");
        config.write_config(&saved).unwrap();

        let (_dir2, mut reloaded) = fixture();
        reloaded.load_config(&saved).unwrap();
        assert_eq!(reloaded.lookup("DEBUG").unwrap().value, "n");
        assert_eq!(reloaded.lookup("BOARD").unwrap().value, "mps2-an385");
        assert_eq!(reloaded.lookup("CORES").unwrap().value, "4");
    }

    #[test]
    fn disabled_booleans_round_trip_through_the_comment_form() {
        let (dir, mut config) = fixture();
        config.set_value("DEBUG", "n").unwrap();
        let saved = dir.path().join(".config");
        config.write_config(&saved).unwrap();
        let text = fs::read_to_string(&saved).unwrap();
        assert!(text.contains("# CONFIG_DEBUG is not set"));
        assert!(!text.contains("CONFIG_DEBUG=n"));
    }

    #[test]
    fn stale_entries_are_ignored() {
        let (dir, mut config) = fixture();
        let saved = dir.path().join(".config");
        fs::write(&saved, "CONFIG_REMOVED=y\nCONFIG_CORES=8\n").unwrap();
        config.load_config(&saved).unwrap();
        assert_eq!(config.lookup("CORES").unwrap().value, "8");
        assert!(config.lookup("REMOVED").is_none());
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let (dir, mut config) = fixture();
        let saved = dir.path().join(".config");
        fs::write(&saved, "CONFIG_CORES\n").unwrap();
        assert!(config.load_config(&saved).is_err());
        fs::write(&saved, "CORES=8\n").unwrap();
        assert!(config.load_config(&saved).is_err());
        fs::write(&saved, "CONFIG_CORES=eight\n").unwrap();
        assert!(config.load_config(&saved).is_err());
        fs::write(&saved, "CONFIG_BOARD=unquoted\n").unwrap();
        assert!(config.load_config(&saved).is_err());
    }
}
