use dotenv::dotenv;
use reqwest::Url;
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Webhook endpoint. The path carries the token, so only scheme and host are
/// ever printed.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl(Url);

impl WebhookUrl {
    /// Accepts absolute `http`/`https` URLs only.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw.trim()).ok()?;
        match url.scheme() {
            "http" | "https" => Some(WebhookUrl(url)),
            _ => None,
        }
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or("")
    }
}

impl fmt::Display for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/[redacted]", self.0.scheme(), self.host())
    }
}

impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WebhookUrl").field(&self.to_string()).finish()
    }
}

/// How attachments are packed into the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Base64 attachments under a `files` key in a JSON body. The webhook
    /// service does not document this shape; it ignores the attachments and
    /// only posts the message text.
    #[default]
    Json,
    /// `payload_json` plus one binary `files[i]` part per attachment.
    Multipart,
}

impl FromStr for DeliveryMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DeliveryMode::Json),
            "multipart" => Ok(DeliveryMode::Multipart),
            _ => Err(()),
        }
    }
}

pub struct Config {
    pub app_url: String,
    pub workers: usize,
    pub cors_domains: Vec<String>,
    pub is_development: bool,

    pub webhook_url: WebhookUrl,
    pub webhook_delivery_mode: DeliveryMode,
    pub webhook_timeout: Option<Duration>,

    pub upload_dir: PathBuf,
    pub max_file_size: usize,
}

pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Env { lookup };

        let webhook_url = vars
            .get_required("DISCORD_WEBHOOK_URL")
            .and_then(|raw| {
                WebhookUrl::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                    key: "DISCORD_WEBHOOK_URL",
                    // never echo the token back
                    value: "<redacted>".to_string(),
                })
            })?;

        let webhook_timeout = match vars.get_optional("WEBHOOK_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(vars.parse("WEBHOOK_TIMEOUT_SECS", &raw)?)),
            None => None,
        };

        let upload_dir = vars
            .get_optional("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Config {
            app_url: vars.get_env("APP_URL", "127.0.0.1:8080"),
            workers: vars.get_env_usize("WORKERS", 2)?,
            cors_domains: vars.get_env_list("CORS_DOMAINS", ""),
            is_development: vars.get_env_bool("IS_DEVELOPMENT", false)?,

            webhook_url,
            webhook_delivery_mode: vars.get_env_parsed(
                "WEBHOOK_DELIVERY_MODE",
                DeliveryMode::default(),
            )?,
            webhook_timeout,

            upload_dir,
            max_file_size: vars.get_env_usize("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE)?,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn get_required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get_optional(key).ok_or(ConfigError::Missing(key))
    }

    fn get_env(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn get_env_list(&self, key: &str, default: &str) -> Vec<String> {
        self.get_env(key, default)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn get_env_usize(&self, key: &'static str, default: usize) -> Result<usize, ConfigError> {
        self.get_env_parsed(key, default)
    }

    fn get_env_bool(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        self.get_env_parsed(key, default)
    }

    fn get_env_parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get_optional(key) {
            Some(raw) => self.parse(key, &raw),
            None => Ok(default),
        }
    }

    fn parse<T: FromStr>(&self, key: &'static str, raw: &str) -> Result<T, ConfigError> {
        raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw.to_string(),
        })
    }
}
