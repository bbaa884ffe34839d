use std::path::PathBuf;
use std::time::Duration;

/// Default Gemini model used by the coach.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default timeout for a single coach request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the JSON task database.
    pub db_path: PathBuf,
    /// API key for the Gemini coach. Without one the offline coach is used.
    pub api_key: Option<String>,
    /// Model name passed to the Gemini API.
    pub model: String,
    /// Request timeout for the coach.
    pub timeout: Duration,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// - `STREAKBOARD_DB`: database path (default `<data dir>/streakboard/tasks.json`).
    /// - `GEMINI_API_KEY` or `API_KEY`: coach credentials.
    /// - `STREAKBOARD_MODEL`: model name.
    /// - `STREAKBOARD_AI_TIMEOUT_SECS`: request timeout.
    pub fn from_env() -> Config {
        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|k| std::env::var(k).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());

        let model = std::env::var("STREAKBOARD_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("STREAKBOARD_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Config {
            db_path: db_path(),
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Returns the path to the tasks database file (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `STREAKBOARD_DB` environment variable.
/// 2. `~/.local/share/streakboard/tasks.json` (on Linux).
/// 3. `./streakboard/tasks.json` (fallback).
fn db_path() -> PathBuf {
    std::env::var("STREAKBOARD_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("streakboard");
            p.push("tasks.json");
            p
        })
}
