use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use deepview_core::config::Config;

pub const WORKSPACE_DIR_ENV: &str = "AGENT_WORKSPACE_DIR";
pub const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deepview").join("config.toml"))
}

/// An explicit `--config` must exist; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match explicit {
        Some(path) => read_config(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => read_config(&path)?,
            _ => Config::default(),
        },
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Blank values are ignored.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(root) = present(WORKSPACE_DIR_ENV) {
        config.workspace.root = PathBuf::from(root);
    }
    if let Some(dir) = present(UPLOAD_DIR_ENV) {
        config.uploads.dir = PathBuf::from(dir);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[view]\nshow_tool_args = false\n\n[uploads]\nmax_bytes = 1024\n",
        )
        .expect("write config");

        let config = read_config(&path).expect("config");
        assert!(!config.view.show_tool_args);
        assert_eq!(config.view.poll_interval_ms, 500);
        assert_eq!(config.uploads.max_bytes, 1024);
        assert_eq!(config.uploads.dir, Config::default().uploads.dir);
        assert_eq!(config.workspace, Config::default().workspace);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().expect("tmpdir");
        let err = load_config(Some(&dir.path().join("nope.toml"))).expect_err("missing");
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[view\nshow_tool_args = ").expect("write config");
        assert!(read_config(&path).is_err());
    }

    #[test]
    fn environment_overrides_directories() {
        let env: HashMap<&str, &str> = HashMap::from([
            (WORKSPACE_DIR_ENV, "/srv/agent"),
            (UPLOAD_DIR_ENV, "   "),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.workspace.root, PathBuf::from("/srv/agent"));
        assert_eq!(config.uploads.dir, Config::default().uploads.dir);
    }
}
