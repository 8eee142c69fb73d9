// Run configuration: the static remote target constants plus the resolved
// settings for one run. Resolution happens once, up front, and the result is
// passed around explicitly; nothing writes to the process environment.

use crate::cli::Cli;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// GitLab instance the configuration repository lives on.
pub const GITLAB_URL: &str = "http://192.168.0.99:8929";

/// Slash-separated path of the repository the Config Server reads from.
pub const PROJECT_PATH: &str = "xz01/springconfig";

/// Branch all file operations are scoped to.
pub const BRANCH: &str = "main";

/// Environment variable (and .env key) holding the token fallback.
pub const TOKEN_VAR: &str = "GITLAB_TOKEN";

/// Config Server endpoint referenced in the final verification hint.
pub const CONFIG_SERVER_URL: &str = "http://localhost:8888";

/// Everything a run needs, resolved once before the first network call.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub overwrite: bool,
}

impl Settings {
    /// Resolve run settings from the parsed command line, the process
    /// environment and an optional .env file. Returns `None` when no token
    /// could be found anywhere; the caller prints usage and exits.
    pub fn resolve(cli: &Cli) -> Option<Self> {
        let token = resolve_token(
            cli.token.clone(),
            std::env::var(TOKEN_VAR).ok(),
            env_file_value(TOKEN_VAR),
        )?;
        Some(Settings {
            token,
            overwrite: cli.overwrite,
        })
    }
}

/// Token precedence: CLI argument beats the process environment, which beats
/// the .env file. An empty string counts as absent and falls through to the
/// next source.
fn resolve_token(
    cli: Option<String>,
    env: Option<String>,
    file: Option<String>,
) -> Option<String> {
    let non_empty = |t: Option<String>| t.filter(|t| !t.is_empty());
    non_empty(cli).or(non_empty(env)).or(non_empty(file))
}

/// Candidate .env locations, nearest first. Only the first file that exists
/// is read.
fn env_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from(".env"),
        PathBuf::from("../.env"),
        PathBuf::from("../../.env"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".env"));
    }
    candidates
}

/// Look up `key` in the first candidate .env file found, if any.
fn env_file_value(key: &str) -> Option<String> {
    let path = env_file_candidates().into_iter().find(|p| p.exists())?;
    lookup_in_file(&path, key)
}

fn lookup_in_file(path: &Path, key: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_env_lines(&text).remove(key),
        Err(e) => {
            log::warn!("failed to read {}: {e}", path.display());
            None
        }
    }
}

/// Parse dotenv-style `KEY=VALUE` lines. Blank lines and `#` comments are
/// ignored, as are lines without `=`. The first occurrence of a key wins.
fn parse_env_lines(text: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            vars.entry(key.trim().to_string())
                .or_insert_with(|| value.trim().to_string());
        }
    }
    vars
}
