//! Load `[env]` table from `$XDG_CONFIG_HOME/<app>/config.toml`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set and non-empty, else the platform config dir.
fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => dirs::config_dir()
            .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".to_string())),
    }
}

fn xdg_config_path(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    let path = config_home()?.join(app_name).join("config.toml");
    if path.exists() {
        Ok(Some(path))
    } else {
        Ok(None)
    }
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Returns env key-value pairs from `[env]` section. Missing file or empty section returns empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = match xdg_config_path(app_name)? {
        Some(p) => p,
        None => return Ok(HashMap::new()),
    };
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), keys = config.env.len(), "xdg config read");
    Ok(config.env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::Path;

    /// Writes `<dir>/<app>/config.toml` and reads it back with `XDG_CONFIG_HOME=dir`.
    fn load_with(app: &str, toml_text: &str) -> Result<HashMap<String, String>, LoadError> {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), toml_text).unwrap();
        with_config_home(dir.path(), || load_env_map(app))
    }

    fn with_config_home<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = crate::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", dir);
        let out = f();
        match prev {
            Some(p) => env::set_var("XDG_CONFIG_HOME", p),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
        out
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let map = load_env_map("ramify-config-test-nonexistent-12345").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn reads_env_table() {
        let map = load_with(
            "ramify-xdg-read",
            "[env]\nGEMINI_API_KEY = \"from_toml\"\nRAMIFY_DEPTH = \"4\"\n",
        )
        .unwrap();
        assert_eq!(map.get("GEMINI_API_KEY").map(String::as_str), Some("from_toml"));
        assert_eq!(map.get("RAMIFY_DEPTH").map(String::as_str), Some("4"));
    }

    #[test]
    fn empty_or_absent_env_table_is_empty() {
        assert!(load_with("ramify-xdg-empty", "[env]\n").unwrap().is_empty());
        assert!(load_with("ramify-xdg-other", "[other]\nkey = \"x\"\n")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let result = load_with("ramify-xdg-bad", "not valid toml [[[\n");
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
