use std::path::{Path, PathBuf};

use anyhow::Context;
use toml::{map::Map, Value};

pub fn workspace_dir() -> PathBuf {
    let output = std::process::Command::new(env!("CARGO"))
        .arg("locate-project")
        .arg("--workspace")
        .arg("--message-format=plain")
        .output()
        .unwrap()
        .stdout;
    let cargo_path = Path::new(std::str::from_utf8(&output).unwrap().trim());
    cargo_path.parent().unwrap().to_path_buf()
}

/// Reads a TOML file located at the workspace root. Both the non-secret
/// `Config.toml` and `Secrets.dev.toml` are loaded through here.
pub fn load_toml(name: &str) -> anyhow::Result<Map<String, Value>> {
    let workspace_dir = workspace_dir();
    let contents = std::fs::read_to_string(workspace_dir.join(name))
        .with_context(|| format!("failed to read {}", name))?;

    toml::from_str::<Map<String, Value>>(&contents)
        .with_context(|| format!("failed to parse {}", name))
}
