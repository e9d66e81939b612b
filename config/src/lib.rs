//! Load configuration from XDG `config.toml` and project `.env`, then apply to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! The ramify CLI calls [`load_and_apply`] with app name `"ramify"` before reading
//! `GEMINI_API_KEY`, `RAMIFY_MODEL`, `RAMIFY_API_BASE`, `RAMIFY_TIMEOUT_SECS`, `PROMPTS_DIR`
//! and the `RAMIFY_K` / `RAMIFY_BREADTH` / `RAMIFY_DEPTH` search defaults, so any of them
//! can live in either file:
//!
//! ```toml
//! # ~/.config/ramify/config.toml
//! [env]
//! GEMINI_API_KEY = "..."
//! RAMIFY_MODEL = "gemini-2.5-flash"
//! ```

mod dotenv;
mod xdg_toml;

use std::path::Path;
use thiserror::Error;

/// Serializes tests that repoint `XDG_CONFIG_HOME`.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Loads config from XDG `config.toml` and optional project `.env`, then sets environment
/// variables only for keys that are **not** already set (so existing env has highest priority).
///
/// Order of precedence when a key is missing in the process environment:
/// 1. Value from project `.env` (current directory or `override_dir` if given)
/// 2. Value from `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` table
///
/// * `app_name`: e.g. `"ramify"`, used for the XDG path `~/.config/<app_name>/config.toml`.
/// * `override_dir`: if `Some`, look for `.env` in this directory instead of `std::env::current_dir()`.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    // Collect all keys from both sources; for each, choose value: env > .env > XDG.
    let mut keys: std::collections::HashSet<String> = xdg_map.keys().cloned().collect();
    keys.extend(dotenv_map.keys().cloned());

    let mut applied = 0usize;
    for key in keys {
        if std::env::var(&key).is_ok() {
            continue; // existing env wins
        }
        let value = dotenv_map
            .get(&key)
            .or_else(|| xdg_map.get(&key))
            .cloned();
        if let Some(v) = value {
            std::env::set_var(&key, v);
            applied += 1;
        }
    }
    tracing::debug!(app = app_name, applied, "config applied to environment");

    Ok(())
}
