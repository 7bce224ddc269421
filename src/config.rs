use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default OpenAI-compatible endpoint for the Groq chat completions API.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Model used for both the map and reduce requests.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
/// Process-wide request timeout applied to every language-model call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;
/// Default OCR program invoked for image uploads.
pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarizer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the Groq API. Absence is reported on the first request, not at startup.
    pub groq_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible chat completions API.
    pub groq_base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Timeout applied to each language-model request, in seconds.
    pub request_timeout_secs: u64,
    /// Maximum number of characters per chunk.
    pub chunk_size: usize,
    /// Number of leading chunks sent through the map stage.
    pub max_chunks: usize,
    /// Maximum number of map requests in flight at once.
    pub map_concurrency: usize,
    /// Program used for optical character recognition on image uploads.
    pub tesseract_command: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            groq_api_key: load_env_optional("GROQ_API_KEY"),
            groq_base_url: load_env_optional("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            model: load_env_optional("SUMMARIZER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout_secs: load_positive(
                "SUMMARIZER_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            chunk_size: load_positive(
                "SUMMARIZER_CHUNK_SIZE",
                crate::processing::chunking::DEFAULT_CHUNK_SIZE,
            )?,
            max_chunks: load_positive(
                "SUMMARIZER_MAX_CHUNKS",
                crate::processing::summarize::DEFAULT_MAX_CHUNKS,
            )?,
            map_concurrency: load_positive("SUMMARIZER_MAP_CONCURRENCY", 1)?,
            tesseract_command: load_env_optional("TESSERACT_CMD")
                .unwrap_or_else(|| DEFAULT_TESSERACT_CMD.to_string()),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            chunk_size: crate::processing::chunking::DEFAULT_CHUNK_SIZE,
            max_chunks: crate::processing::summarize::DEFAULT_MAX_CHUNKS,
            map_concurrency: 1,
            tesseract_command: DEFAULT_TESSERACT_CMD.to_string(),
            server_port: None,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_positive<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = load_env_optional(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();
    let _ = CONFIG.set(Config::from_env()?);
    Ok(())
}
