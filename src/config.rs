use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use actix_web::http::Uri;

use crate::error::{GatewayError, Result};
use crate::logger::LogLevel;
use crate::models::Site;
use crate::prompt::PromptStyle;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_INITIAL_QUOTA: u32 = 50;
pub const DEFAULT_API_BASE: &str = "https://cloud.leonardo.ai/api/rest/v1";
pub const DEFAULT_MODEL_ID: &str = "b24e16ff-06e3-43eb-8d33-4416c2d75876";
const DEFAULT_SITES: &str = "sede1:clave1,sede2:clave2";
const ANY_ORIGIN: &str = "*";

#[derive(Clone)]
pub struct LeonardoConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl LeonardoConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl fmt::Debug for LeonardoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeonardoConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Literal values embedded in every provider job request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model_id: String,
    pub width: u32,
    pub height: u32,
    pub num_images: u32,
    pub preset_style: String,
    pub alchemy: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            width: 1024,
            height: 768,
            num_images: 1,
            preset_style: "DYNAMIC".to_string(),
            alchemy: true,
        }
    }
}

impl GenerationSettings {
    pub fn with_num_images(mut self, num_images: u32) -> Self {
        self.num_images = num_images.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(5),
        }
    }
}

impl PollingConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub leonardo: LeonardoConfig,
    pub generation: GenerationSettings,
    pub polling: PollingConfig,
    pub prompt_style: PromptStyle,
    pub sites: Vec<Site>,
    pub initial_quota: u32,
    pub log_level: LogLevel,
    pub log_json: bool,
    /// Origins allowed to call the gateway from a browser; `["*"]` allows any.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn new(leonardo: LeonardoConfig) -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: "0.0.0.0".to_string(),
            leonardo,
            generation: GenerationSettings::default(),
            polling: PollingConfig::default(),
            prompt_style: PromptStyle::default(),
            // The literal default list always parses.
            sites: parse_sites(DEFAULT_SITES).unwrap_or_default(),
            initial_quota: DEFAULT_INITIAL_QUOTA,
            log_level: LogLevel::Info,
            log_json: false,
            cors_allowed_origins: vec![ANY_ORIGIN.to_string()],
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("LEONARDO_API_KEY").ok_or_else(|| {
            GatewayError::Config("LEONARDO_API_KEY is missing; check your .env file".into())
        })?;

        let mut leonardo = LeonardoConfig::new(api_key).with_timeout(Duration::from_secs(
            parse_var(&get, "PROVIDER_TIMEOUT_SECS", 30u64)?,
        ));
        if let Some(base_url) = get("LEONARDO_API_BASE") {
            leonardo = leonardo.with_base_url(base_url);
        }

        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            model_id: get("LEONARDO_MODEL_ID").unwrap_or(defaults.model_id),
            width: parse_var(&get, "IMAGE_WIDTH", defaults.width)?,
            height: parse_var(&get, "IMAGE_HEIGHT", defaults.height)?,
            num_images: parse_var(&get, "NUM_IMAGES", defaults.num_images)?,
            preset_style: get("PRESET_STYLE").unwrap_or(defaults.preset_style),
            alchemy: parse_var(&get, "ALCHEMY", defaults.alchemy)?,
        };
        if generation.num_images == 0 {
            return Err(GatewayError::Config("NUM_IMAGES must be at least 1".into()));
        }

        let max_attempts = parse_var(&get, "POLL_MAX_ATTEMPTS", 20u32)?;
        if max_attempts == 0 {
            return Err(GatewayError::Config(
                "POLL_MAX_ATTEMPTS must be at least 1".into(),
            ));
        }
        let polling = PollingConfig::new(
            max_attempts,
            Duration::from_secs(parse_var(&get, "POLL_INTERVAL_SECS", 5u64)?),
        );

        let sites = parse_sites(&get("SEDES").unwrap_or_else(|| DEFAULT_SITES.to_string()))?;

        let log_json = match get("LOG_FORMAT").as_deref() {
            None | Some("pretty") => false,
            Some("json") => true,
            Some(other) => {
                return Err(GatewayError::Config(format!(
                    "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            port: parse_var(&get, "PORT", DEFAULT_PORT)?,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            leonardo,
            generation,
            polling,
            prompt_style: parse_var(&get, "PROMPT_STYLE", PromptStyle::default())?,
            sites,
            initial_quota: parse_var(&get, "INITIAL_QUOTA", DEFAULT_INITIAL_QUOTA)?,
            log_level: parse_var(&get, "LOG_LEVEL", LogLevel::Info)?,
            log_json,
            cors_allowed_origins: parse_origins(
                &get("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| ANY_ORIGIN.to_string()),
            )?,
        })
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_cors_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_allowed_origins = origins;
        self
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|origin| origin == ANY_ORIGIN)
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid {} '{}': {}", key, raw, e))),
    }
}

/// Parse `id:password` pairs separated by commas.
pub fn parse_sites(raw: &str) -> Result<Vec<Site>> {
    let mut sites: Vec<Site> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (id, password) = entry
            .split_once(':')
            .map(|(id, password)| (id.trim(), password.trim()))
            .filter(|(id, password)| !id.is_empty() && !password.is_empty())
            .ok_or_else(|| {
                GatewayError::Config(format!(
                    "Invalid SEDES entry '{}', expected id:password",
                    entry
                ))
            })?;

        if sites.iter().any(|site| site.id == id) {
            return Err(GatewayError::Config(format!("Duplicate sede '{}' in SEDES", id)));
        }
        sites.push(Site::new(id, password));
    }

    if sites.is_empty() {
        return Err(GatewayError::Config("SEDES lists no sites".into()));
    }
    Ok(sites)
}

/// Parse a comma-separated list of browser origins. `*` on its own allows any origin.
pub fn parse_origins(raw: &str) -> Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect();

    match origins.as_slice() {
        [] => Err(GatewayError::Config(
            "CORS_ALLOWED_ORIGINS lists no origins".into(),
        )),
        [only] if only == ANY_ORIGIN => Ok(origins),
        _ => {
            for origin in &origins {
                let valid = origin
                    .parse::<Uri>()
                    .map(|uri| uri.scheme().is_some() && uri.host().is_some())
                    .unwrap_or(false);
                if !valid {
                    return Err(GatewayError::Config(format!(
                        "Invalid CORS origin '{}', expected scheme://host[:port]",
                        origin
                    )));
                }
            }
            Ok(origins)
        }
    }
}
