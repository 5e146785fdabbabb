/// Default Gemini REST base URL.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used for image edits.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Model used for suggestions and prompt coaching.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Image generation can take a while; keep the default generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
    pub image_model: String,
    pub text_model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) environment variable not set")]
    MissingApiKey,

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl GeminiConfig {
    /// Configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                                     |
    /// |-----------------------|---------------------------------------------|
    /// | `GEMINI_API_KEY`      | falls back to `API_KEY`; required           |
    /// | `GEMINI_API_URL`      | `https://generativelanguage.googleapis.com` |
    /// | `GEMINI_IMAGE_MODEL`  | `gemini-2.5-flash-image`                    |
    /// | `GEMINI_TEXT_MODEL`   | `gemini-2.5-flash`                          |
    /// | `GEMINI_TIMEOUT_SECS` | `120`                                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("GEMINI_API_URL") {
            config.api_url = url;
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(raw) = lookup("GEMINI_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| ConfigError::Invalid {
                name: "GEMINI_TIMEOUT_SECS",
                expected: "u64",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}
