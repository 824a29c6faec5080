use std::fs;
use std::path::{Path, PathBuf};

use ribbon_kconfig::{artifacts, project, tree, workspace};

fn setup_project(root: &Path) {
    for dir in workspace::SUBDIRS {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
}

fn write_component(root: &Path, component: &str, module: &str, schema: &str) -> PathBuf {
    let dir = root.join("components").join(component).join(module);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Kconfig"), schema).unwrap();
    root.join("components").join(component)
}

#[test]
fn distclean_leaves_three_empty_directories() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    fs::write(dir.path().join("build/stale.o"), "x").unwrap();
    fs::create_dir(dir.path().join("install/bin")).unwrap();
    fs::write(dir.path().join("install/bin/tool"), "x").unwrap();

    workspace::distclean(dir.path()).unwrap();
    // end state is stable under a second run
    workspace::distclean(dir.path()).unwrap();

    for sub in workspace::SUBDIRS {
        let path = dir.path().join(sub);
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(&path).unwrap().count(), 0);
    }
}

#[test]
fn distclean_fails_on_a_missing_project() {
    let dir = tempfile::tempdir().unwrap();
    assert!(workspace::distclean(&dir.path().join("missing")).is_err());
}

#[test]
fn tree_lists_project_then_components_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    let net = write_component(
        dir.path(),
        "net",
        "wifi",
        "config WIFI\n    bool \"WiFi support\"\n    default y\n",
    );
    let storage = write_component(
        dir.path(),
        "storage",
        "flash",
        "config FLASH_SIZE_KB\n    int \"Flash size\"\n    default 4096\n",
    );

    tree::generate(dir.path(), &[net.clone(), storage.clone()]).unwrap();

    let text = fs::read_to_string(dir.path().join(tree::GENERATED_TREE)).unwrap();
    assert!(text.starts_with("#generated automatically by ribbon-kconfig"));
    let project_menu = text.find("menu \"project Configuration\"").unwrap();
    let net_menu = text.find("menu \"net Configuration\"").unwrap();
    let storage_menu = text.find("menu \"storage Configuration\"").unwrap();
    assert!(project_menu < net_menu);
    assert!(net_menu < storage_menu);
    assert_eq!(text.matches("menu \"").count(), 3);
    assert_eq!(text.matches("endmenu").count(), 3);
    assert!(text.contains(&format!("osource \"{}/*/Kconfig\"", net.display())));
    assert!(text.contains(&format!("osource \"{}/*/Kconfig\"", storage.display())));
}

#[test]
fn project_init_persists_defaults_and_emits_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    let net = write_component(
        dir.path(),
        "net",
        "wifi",
        "config WIFI\n    bool \"WiFi support\"\n    default y\n",
    );

    project::project_init(dir.path(), &[net]).unwrap();

    let selections = fs::read_to_string(dir.path().join(project::SELECTION_FILE)).unwrap();
    assert!(selections.contains("CONFIG_WIFI=y"));
    assert!(selections.contains("CONFIG_SYSTEM_NAME=\"Linux\""));

    let settings = fs::read_to_string(dir.path().join(artifacts::SETTINGS_FILE)).unwrap();
    assert!(settings.contains("set(CONFIG_WIFI on)"));
    assert!(settings.contains("set(CONFIG_SYSTEM_NAME \"Linux\")"));

    let toolchain = fs::read_to_string(dir.path().join(artifacts::TOOLCHAIN_FILE)).unwrap();
    assert!(toolchain.contains("set(CMAKE_SYSTEM_NAME \"Linux\")"));
    assert!(toolchain.contains("set(CMAKE_C_COMPILER \"arm-none-eabi-gcc\")"));
}

#[test]
fn first_load_creates_the_config_directory() {
    let dir = tempfile::tempdir().unwrap();
    // no config/ yet, only build/ and install/
    fs::create_dir_all(dir.path().join("build")).unwrap();
    fs::create_dir_all(dir.path().join("install")).unwrap();

    tree::generate(dir.path(), &[]).unwrap();
    project::first_load(dir.path()).unwrap();

    assert!(dir.path().join("config").is_dir());
    assert!(dir.path().join(project::SELECTION_FILE).is_file());
}

#[test]
fn first_load_is_gated_solely_on_the_selection_file() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path());
    let net = write_component(
        dir.path(),
        "net",
        "wifi",
        "config WIFI\n    bool \"WiFi support\"\n    default y\n",
    );
    project::project_init(dir.path(), &[net]).unwrap();

    let selections = dir.path().join(project::SELECTION_FILE);
    let before = fs::read_to_string(&selections).unwrap();

    // deleting only the settings file must not trigger regeneration
    fs::remove_file(dir.path().join(artifacts::SETTINGS_FILE)).unwrap();
    project::first_load(dir.path()).unwrap();

    assert!(!dir.path().join(artifacts::SETTINGS_FILE).exists());
    assert_eq!(fs::read_to_string(&selections).unwrap(), before);
}
