//! `.env` reader. Produces a key-value map; applying it to the environment happens in lib.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` in `override_dir`, or in the current directory.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Strips one layer of matching quotes. Double quotes honour `\"`; single quotes are literal.
fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1].replace("\\\"", "\"");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    // unquoted: ` #` starts a trailing comment
    match raw.find(" #") {
        Some(pos) => raw[..pos].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Parses `KEY=VALUE` lines.
///
/// Blank lines and lines starting with `#` are skipped, as are lines without `=` or with
/// an empty key. An optional leading `export ` is ignored. No multiline values.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let l = l.strip_prefix("export ").unwrap_or(l);
            let (k, v) = l.split_once('=')?;
            let key = k.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(v.trim())))
        })
        .collect()
}

/// Loads `.env` from `override_dir` or the current directory. A missing file is an empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_dotenv(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(m: &'a HashMap<String, String>, k: &str) -> Option<&'a str> {
        m.get(k).map(String::as_str)
    }

    #[test]
    fn parses_keys_and_skips_noise() {
        let m = parse_dotenv(
            "\n# credentials\nGEMINI_API_KEY=abc\nNOT_A_PAIR\n=orphan\n  RAMIFY_MODEL = gemini-2.5-pro \n",
        );
        assert_eq!(m.len(), 2);
        assert_eq!(get(&m, "GEMINI_API_KEY"), Some("abc"));
        assert_eq!(get(&m, "RAMIFY_MODEL"), Some("gemini-2.5-pro"));
    }

    #[test]
    fn quoted_values() {
        let m = parse_dotenv("A=\"hello world\"\nB='a # b'\nC=\"say \\\"hi\\\"\"\nD=\"\"\nE=");
        assert_eq!(get(&m, "A"), Some("hello world"));
        assert_eq!(get(&m, "B"), Some("a # b"));
        assert_eq!(get(&m, "C"), Some("say \"hi\""));
        assert_eq!(get(&m, "D"), Some(""));
        assert_eq!(get(&m, "E"), Some(""));
    }

    #[test]
    fn export_prefix_and_trailing_comment() {
        let m = parse_dotenv("export RAMIFY_K=4 # proposals\nRAMIFY_API_BASE=http://h/#frag");
        assert_eq!(get(&m, "RAMIFY_K"), Some("4"));
        assert_eq!(get(&m, "RAMIFY_API_BASE"), Some("http://h/#frag"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn reads_file_from_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "A=1\nB=2\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(get(&m, "A"), Some("1"));
        assert_eq!(get(&m, "B"), Some("2"));
    }
}
