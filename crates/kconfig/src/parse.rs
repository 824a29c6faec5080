use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::{Config, Menu, Symbol, SymbolKind};

struct OpenMenu {
    index: usize,
    file: PathBuf,
    line: usize,
}

pub(crate) struct Parser {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
    menus: Vec<Menu>,
    menu_stack: Vec<OpenMenu>,
    // files currently being parsed, to reject source cycles
    active: Vec<PathBuf>,
}

impl Parser {
    pub(crate) fn new() -> Self {
        Self {
            symbols: Vec::new(),
            index: HashMap::new(),
            menus: Vec::new(),
            menu_stack: Vec::new(),
            active: Vec::new(),
        }
    }

    pub(crate) fn into_config(self) -> Result<Config, Error> {
        if let Some(open) = self.menu_stack.last() {
            return Err(Error::parse(
                &open.file,
                open.line,
                format!("menu \"{}\" has no endmenu", self.menus[open.index].title),
            ));
        }
        Ok(Config::from_parts(self.symbols, self.index, self.menus))
    }

    pub(crate) fn parse_file(&mut self, path: &Path) -> Result<(), Error> {
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.active.contains(&canonical) {
            return Err(Error::parse(path, 0, "recursive source"));
        }
        self.active.push(canonical);
        let result = self.parse_lines(path);
        self.active.pop();
        result
    }

    fn parse_lines(&mut self, path: &Path) -> Result<(), Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;
        while i < lines.len() {
            let line_no = i + 1;
            let line = lines[i].trim();
            i += 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (keyword, rest) = split_keyword(line);
            match keyword {
                "menu" => {
                    let title = unquote(rest).ok_or_else(|| {
                        Error::parse(path, line_no, "menu title must be a quoted string")
                    })?;
                    self.menu_stack.push(OpenMenu {
                        index: self.menus.len(),
                        file: path.to_path_buf(),
                        line: line_no,
                    });
                    self.menus.push(Menu {
                        title: title.to_string(),
                        symbols: Vec::new(),
                    });
                }
                "endmenu" => {
                    if self.menu_stack.pop().is_none() {
                        return Err(Error::parse(path, line_no, "endmenu without matching menu"));
                    }
                }
                "source" | "osource" => {
                    let target = unquote(rest).ok_or_else(|| {
                        Error::parse(path, line_no, "sourced path must be a quoted string")
                    })?;
                    self.source(path, line_no, target, keyword == "osource")?;
                }
                "config" => {
                    i = self.parse_symbol(path, &lines, i, line_no, rest)?;
                }
                _ => {
                    return Err(Error::parse(
                        path,
                        line_no,
                        format!("unsupported directive `{keyword}`"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Parses the attribute lines of a `config NAME` stanza. `start` is the
    /// index of the first line after the `config` line; returns the index of
    /// the first line past the stanza.
    fn parse_symbol(
        &mut self,
        path: &Path,
        lines: &[&str],
        start: usize,
        config_line: usize,
        name: &str,
    ) -> Result<usize, Error> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::parse(
                path,
                config_line,
                format!("invalid symbol name `{name}`"),
            ));
        }
        if self.index.contains_key(name) {
            return Err(Error::parse(
                path,
                config_line,
                format!("symbol `{name}` is already defined"),
            ));
        }

        let mut kind: Option<SymbolKind> = None;
        let mut prompt: Option<String> = None;
        let mut default: Option<(String, usize)> = None;
        let mut i = start;
        while i < lines.len() {
            let line_no = i + 1;
            let line = lines[i].trim();
            if line.is_empty() || line.starts_with('#') {
                i += 1;
                continue;
            }
            let (keyword, rest) = split_keyword(line);
            match keyword {
                "bool" | "string" | "int" => {
                    kind = Some(match keyword {
                        "bool" => SymbolKind::Bool,
                        "string" => SymbolKind::String,
                        _ => SymbolKind::Int,
                    });
                    if !rest.is_empty() {
                        let text = unquote(rest).ok_or_else(|| {
                            Error::parse(path, line_no, "prompt must be a quoted string")
                        })?;
                        prompt = Some(text.to_string());
                    }
                    i += 1;
                }
                "prompt" => {
                    let text = unquote(rest).ok_or_else(|| {
                        Error::parse(path, line_no, "prompt must be a quoted string")
                    })?;
                    prompt = Some(text.to_string());
                    i += 1;
                }
                "default" => {
                    if rest.is_empty() {
                        return Err(Error::parse(path, line_no, "default without a value"));
                    }
                    default = Some((rest.to_string(), line_no));
                    i += 1;
                }
                "help" => {
                    i = skip_help(lines, i + 1);
                }
                "menu" | "endmenu" | "source" | "osource" | "config" => break,
                _ => {
                    return Err(Error::parse(
                        path,
                        line_no,
                        format!("unsupported directive `{keyword}`"),
                    ));
                }
            }
        }

        let kind = kind.ok_or_else(|| {
            Error::parse(path, config_line, format!("symbol `{name}` has no type"))
        })?;
        let value = match default {
            None => default_for(kind).to_string(),
            Some((raw, line_no)) => default_value(path, line_no, kind, &raw)?,
        };

        let idx = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            prompt,
            value,
        });
        self.index.insert(name.to_string(), idx);
        if let Some(open) = self.menu_stack.last() {
            self.menus[open.index].symbols.push(idx);
        }
        Ok(i)
    }

    /// Resolves a `source`/`osource` target. A single `*` path component is
    /// expanded against the directory entries, in sorted order.
    fn source(&mut self, from: &Path, line: usize, target: &str, optional: bool) -> Result<(), Error> {
        if target.contains('*') {
            let Some((prefix, suffix)) = target.split_once("/*/") else {
                return Err(Error::parse(
                    from,
                    line,
                    format!("unsupported wildcard pattern `{target}`"),
                ));
            };
            if prefix.contains('*') || suffix.contains('*') {
                return Err(Error::parse(
                    from,
                    line,
                    format!("unsupported wildcard pattern `{target}`"),
                ));
            }
            let entries = match fs::read_dir(prefix) {
                Ok(entries) => entries,
                Err(source) if optional && source.kind() == io::ErrorKind::NotFound => {
                    return Ok(());
                }
                Err(source) => return Err(Error::io(Path::new(prefix), source)),
            };
            let mut dirs = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| Error::io(Path::new(prefix), source))?;
                dirs.push(entry.path());
            }
            dirs.sort();
            let mut matched = false;
            for dir in dirs {
                let candidate = dir.join(suffix);
                if candidate.is_file() {
                    matched = true;
                    self.parse_file(&candidate)?;
                }
            }
            if !matched && !optional {
                return Err(Error::parse(
                    from,
                    line,
                    format!("`{target}` matched no files"),
                ));
            }
            Ok(())
        } else {
            let path = Path::new(target);
            if !path.is_file() {
                if optional {
                    return Ok(());
                }
                return Err(Error::parse(
                    from,
                    line,
                    format!("sourced file `{target}` does not exist"),
                ));
            }
            self.parse_file(path)
        }
    }
}

fn default_for(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Bool => "n",
        SymbolKind::String => "",
        SymbolKind::Int => "0",
    }
}

fn default_value(path: &Path, line: usize, kind: SymbolKind, raw: &str) -> Result<String, Error> {
    match kind {
        SymbolKind::Bool => {
            if raw == "y" || raw == "n" {
                Ok(raw.to_string())
            } else {
                Err(Error::parse(path, line, "boolean default must be `y` or `n`"))
            }
        }
        SymbolKind::String => {
            let text = unquote(raw).ok_or_else(|| {
                Error::parse(path, line, "string default must be a quoted literal")
            })?;
            Ok(text.to_string())
        }
        SymbolKind::Int => {
            if raw.parse::<i64>().is_ok() {
                Ok(raw.to_string())
            } else {
                Err(Error::parse(
                    path,
                    line,
                    format!("`{raw}` is not an integer literal"),
                ))
            }
        }
    }
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

pub(crate) fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('"')?.strip_suffix('"')
}

/// Skips a `help` block: every following line indented at least as far as
/// the first non-blank body line belongs to the help text.
fn skip_help(lines: &[&str], start: usize) -> usize {
    let mut i = start;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    if i == lines.len() {
        return i;
    }
    let body_indent = indent_of(lines[i]);
    if body_indent == 0 {
        return i;
    }
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() || indent_of(line) >= body_indent {
            i += 1;
        } else {
            break;
        }
    }
    i
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 8 } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn load(schema: &str) -> Result<Config, Error> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Kconfig");
        fs::write(&path, schema).unwrap();
        Config::load_tree(&path)
    }

    #[test]
    fn help_blocks_are_skipped() {
        let config = load(
            "config A\n    bool \"A\"\n    help\n      Longer explanation\n      over two lines.\n    default y\n",
        )
        .unwrap();
        assert_eq!(config.lookup("A").unwrap().value, "y");
    }

    #[test]
    fn unsupported_directive_is_rejected() {
        let err = load("config A\n    bool\n    depends on B\n").unwrap_err();
        match err {
            Error::Parse { line, msg, .. } => {
                assert_eq!(line, 3);
                assert!(msg.contains("depends"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn untyped_symbol_is_rejected() {
        assert!(load("config A\n    default y\n").is_err());
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let err = load("config A\n    bool\nconfig A\n    bool\n").unwrap_err();
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn unbalanced_menu_is_rejected() {
        let err = load("menu \"Open\"\nconfig A\n    bool\n").unwrap_err();
        assert!(err.to_string().contains("no endmenu"));
    }

    #[test]
    fn source_requires_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.Kconfig");
        let root = dir.path().join("Kconfig");
        fs::write(&root, format!("source \"{}\"\n", missing.display())).unwrap();
        assert!(Config::load_tree(&root).is_err());

        // osource tolerates the absence
        fs::write(&root, format!("osource \"{}\"\n", missing.display())).unwrap();
        let config = Config::load_tree(&root).unwrap();
        assert!(config.symbols().is_empty());
    }

    #[test]
    fn osource_expands_one_directory_level_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let comps = dir.path().join("components");
        for (sub, name) in [("bbb", "SECOND"), ("aaa", "FIRST")] {
            let d = comps.join(sub);
            fs::create_dir_all(&d).unwrap();
            fs::write(d.join("Kconfig"), format!("config {name}\n    bool\n")).unwrap();
        }
        // a subdirectory without a Kconfig is skipped
        fs::create_dir_all(comps.join("ccc")).unwrap();

        let root = dir.path().join("Kconfig");
        fs::write(&root, format!("osource \"{}/*/Kconfig\"\n", comps.display())).unwrap();
        let config = Config::load_tree(&root).unwrap();
        let names: Vec<_> = config.symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["FIRST", "SECOND"]);
    }

    #[test]
    fn recursive_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Kconfig");
        fs::write(&root, format!("source \"{}\"\n", root.display())).unwrap();
        let err = Config::load_tree(&root).unwrap_err();
        assert!(err.to_string().contains("recursive"));
    }
}
