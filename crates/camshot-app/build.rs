//! Injects the workspace `VERSION` file as `CAMSHOT_VERSION`.

use std::path::{Path, PathBuf};

fn workspace_version_file() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set");
    Path::new(&manifest_dir)
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root")
        .join("VERSION")
}

fn main() {
    let version_file = workspace_version_file();
    println!("cargo:rerun-if-changed={}", version_file.display());

    let contents = std::fs::read_to_string(&version_file)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_file.display()));
    let version = contents.trim();
    let well_formed = !version.is_empty()
        && version.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    assert!(well_formed, "VERSION must look like `1.2.3`, got `{version}`");

    println!("cargo:rustc-env=CAMSHOT_VERSION={version}");
}
