use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-level settings read from `.causeway/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub identify: IdentifyConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Upper bound on interior nodes per enumerated path. `None` = unbounded.
    #[serde(default)]
    pub max_intermediate_nodes: Option<usize>,
}

/// Search limits for the built-in identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyConfig {
    #[serde(default = "default_max_backdoor_set_size")]
    pub max_backdoor_set_size: usize,
    #[serde(default = "default_max_backdoor_sets")]
    pub max_backdoor_sets: usize,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            max_backdoor_set_size: default_max_backdoor_set_size(),
            max_backdoor_sets: default_max_backdoor_sets(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
}

/// Path of the project config file under `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".causeway/config.toml")
}

/// Load `.causeway/config.toml` under `project_root`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the user config from the platform config directory, or defaults if
/// absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("causeway/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge the project and user configs.
///
/// # Errors
///
/// Propagates errors from [`load_project_config`] and [`load_user_config`].
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;
    Ok(EffectiveConfig { project, user })
}

const fn default_max_backdoor_set_size() -> usize {
    4
}

const fn default_max_backdoor_sets() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.paths.max_intermediate_nodes, None);
        assert_eq!(cfg.identify.max_backdoor_set_size, 4);
        assert_eq!(cfg.identify.max_backdoor_sets, 16);
    }

    #[test]
    fn partial_project_config_fills_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".causeway")).expect("create .causeway");
        std::fs::write(
            project_config_path(root.path()),
            "[paths]\nmax_intermediate_nodes = 6\n\n[identify]\nmax_backdoor_sets = 3\n",
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.paths.max_intermediate_nodes, Some(6));
        assert_eq!(cfg.identify.max_backdoor_sets, 3);
        assert_eq!(cfg.identify.max_backdoor_set_size, 4);
    }

    #[test]
    fn malformed_project_config_reports_path() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".causeway")).expect("create .causeway");
        std::fs::write(project_config_path(root.path()), "[identify\n").expect("write config");

        let err = load_project_config(root.path()).expect_err("parse should fail");
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
