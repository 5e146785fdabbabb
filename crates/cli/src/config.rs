use std::path::PathBuf;

/// Directory name under the platform data dir.
const APP_DIR: &str = "canvas-ai";

/// CLI configuration loaded from environment variables.
///
/// Gemini settings live in [`canvas_gemini::GeminiConfig`] and are only
/// required by the commands that call the API.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Where the project store keeps its files.
    pub data_dir: PathBuf,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                                    |
    /// |-------------------|--------------------------------------------|
    /// | `CANVAS_DATA_DIR` | platform data dir + `canvas-ai` (else `./canvas-ai`) |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("CANVAS_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self { data_dir }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
