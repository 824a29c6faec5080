use std::env;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let schema = Path::new(&manifest_dir).join("project.Kconfig");
    println!("cargo:rustc-env=PROJECT_KCONFIG={}", schema.display());
    println!("cargo:rerun-if-changed=project.Kconfig");
}
