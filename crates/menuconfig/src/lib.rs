pub use kconfig::{Config, Error, Menu, Symbol, SymbolKind};

#[cfg(feature = "menuconfig")]
pub mod term;
