use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

/// `fixtures/<endpoint>/<case>.json` inside this crate.
pub fn fixture_path(endpoint: &str, case: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(endpoint)
        .join(format!("{case}.json"))
}

pub fn read_fixture<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("cannot decode {}", path.display()))
}
