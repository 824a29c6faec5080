use std::path::PathBuf;

use crate::SymbolKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: {msg}", file.display())]
    Parse {
        file: PathBuf,
        line: usize,
        msg: String,
    },
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),
    #[error("invalid value `{value}` for {kind} symbol `{name}`")]
    InvalidValue {
        name: String,
        kind: SymbolKind,
        value: String,
    },
}

impl Error {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(file: &std::path::Path, line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            file: file.to_path_buf(),
            line,
            msg: msg.into(),
        }
    }
}
