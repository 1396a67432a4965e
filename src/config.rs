use crate::types::*;
use std::{env, fs, path::PathBuf};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        repo_root().join(path)
    }
}

pub fn env_default(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn overlay_addr() -> String {
    env_default("OVERLAY_ADDR").unwrap_or_else(|| DEFAULT_OVERLAY_ADDR.to_string())
}

pub fn logs_dir() -> PathBuf {
    env_default("LOG_DIR")
        .map(|raw| resolve_repo_path(&raw))
        .unwrap_or_else(|| repo_root().join("logs"))
}

/// Save file to open at startup, if configured and present.
pub fn autoload_save_path() -> Option<PathBuf> {
    env_default("AUTOLOAD_SAVE")
        .map(|raw| resolve_repo_path(&raw))
        .filter(|path| path.is_file())
}

/// Reads `.env` next to the manifest. Variables already set in the
/// environment win.
pub fn load_env_file() {
    let Ok(contents) = fs::read_to_string(repo_root().join(".env")) else {
        return;
    };
    contents
        .lines()
        .filter_map(parse_env_line)
        .filter(|(key, _)| env::var_os(key).is_none())
        .for_each(|(key, value)| env::set_var(key, value));
}

/// `KEY=value` with an optional quoted value or trailing `#` comment.
pub fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    let value = value.trim();
    let value = ['"', '\'']
        .into_iter()
        .find_map(|quote| value.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or_else(|| value.split('#').next().unwrap_or_default().trim_end());
    Some((key.to_string(), value.to_string()))
}

pub fn log_env_warnings() {
    if let Some(raw) = env_default("AUTOLOAD_SAVE") {
        if autoload_save_path().is_none() {
            tracing::warn!("AUTOLOAD_SAVE points at {raw}, which is not a file; starting empty");
        }
    }
    if let Some(addr) = env_default("OVERLAY_ADDR") {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::warn!("OVERLAY_ADDR {addr} is not a socket address; the overlay server will fail to bind");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_assignment() {
        assert_eq!(
            parse_env_line("OVERLAY_ADDR=127.0.0.1:4000"),
            Some(("OVERLAY_ADDR".to_string(), "127.0.0.1:4000".to_string()))
        );
    }

    #[test]
    fn strips_quotes_and_comments() {
        assert_eq!(
            parse_env_line("LOG_DIR=\"my logs\""),
            Some(("LOG_DIR".to_string(), "my logs".to_string()))
        );
        assert_eq!(
            parse_env_line("AUTOLOAD_SAVE=event.json # main event"),
            Some(("AUTOLOAD_SAVE".to_string(), "event.json".to_string()))
        );
        assert_eq!(
            parse_env_line("KEY='a # b'"),
            Some(("KEY".to_string(), "a # b".to_string()))
        );
    }

    #[test]
    fn skips_blank_comment_and_keyless_lines() {
        assert_eq!(parse_env_line("   "), None);
        assert_eq!(parse_env_line("# OVERLAY_ADDR=x"), None);
        assert_eq!(parse_env_line("=value"), None);
        assert_eq!(parse_env_line("no_equals_sign"), None);
        assert_eq!(parse_env_line("export LOG_DIR=logs"), None);
    }

    #[test]
    fn relative_paths_resolve_against_repo() {
        assert_eq!(resolve_repo_path("logs"), repo_root().join("logs"));
        let absolute = std::env::temp_dir();
        assert_eq!(resolve_repo_path(&absolute.to_string_lossy()), absolute);
    }
}
