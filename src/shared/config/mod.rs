//! Application configuration module
//!
//! All runtime settings are read once from the process environment (after
//! `.env` has been loaded) into an [`AppConfig`]. Each upstream integration
//! gets its own section so handlers only see the settings they need.
//!
//! Missing credentials are not a startup error: the section keeps `None` and
//! the dependent endpoint reports a server error when it is called.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback redirect target for payment flows
pub const DEFAULT_FRONT_BASE_URL: &str = "http://localhost:5173";

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Listener and public URLs
    pub server: ServerSettings,
    /// Chat-completions API
    pub openai: OpenAiSettings,
    /// S3-compatible object storage
    pub storage: StorageSettings,
    /// Instagram Graph API
    pub instagram: InstagramSettings,
    /// Toss payments API
    pub toss: TossSettings,
    /// National Tax Service business verification
    pub nts: NtsSettings,
    /// Card composition assets
    pub card: CardSettings,
    /// Administrator account seeded at startup
    pub admin: Option<AdminSeed>,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    /// `None` disables every database-backed endpoint
    pub database_url: Option<String>,
    /// Public URL of this API, used to build payment callback URLs
    pub base_url: String,
    /// Public URL of the web frontend, used for payment redirects
    pub front_base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: Some("sqlite://pium.db?mode=rwc".to_string()),
            base_url: "http://localhost:8000".to_string(),
            front_base_url: DEFAULT_FRONT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Upper bound for the single wait after a 429
    pub rate_limit_wait_secs: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            rate_limit_wait_secs: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Default lifetime of presigned GET URLs, in seconds
    pub presign_expires: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://kr.object.ncloudstorage.com".to_string(),
            bucket: "pium-dev".to_string(),
            region: "kr-standard".to_string(),
            access_key: None,
            secret_key: None,
            presign_expires: 600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstagramSettings {
    pub graph_base: String,
    pub user_id: Option<String>,
    pub access_token: Option<String>,
}

impl Default for InstagramSettings {
    fn default() -> Self {
        Self {
            graph_base: "https://graph.facebook.com/v19.0".to_string(),
            user_id: None,
            access_token: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TossSettings {
    pub api_base: String,
    pub secret_key: Option<String>,
}

impl Default for TossSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.tosspayments.com".to_string(),
            secret_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NtsSettings {
    pub api_base: String,
    pub api_key: Option<String>,
    /// `false` skips the upstream check entirely (local development)
    pub validate: bool,
}

impl Default for NtsSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.odcloud.kr/api/nts-businessman/v1".to_string(),
            api_key: None,
            validate: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardSettings {
    pub font_path: PathBuf,
    /// Object key of the default card background
    pub background_key: String,
    /// `#RRGGBB` colour of the district title line
    pub district_color: String,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("assets/fonts/card.ttf"),
            background_key: "assets/bg/gradient.jpg".to_string(),
            district_color: "#FF8601".to_string(),
        }
    }
}

impl CardSettings {
    /// Parse the district colour into RGB components
    pub fn district_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color(&self.district_color)
    }
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = AppConfig::default();

        let port = match get("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber("SERVER_PORT", raw))?,
            None => defaults.server.port,
        };
        let rate_limit_wait_secs = match get("OPENAI_RATE_LIMIT_WAIT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber("OPENAI_RATE_LIMIT_WAIT_SECS", raw))?,
            None => defaults.openai.rate_limit_wait_secs,
        };
        let presign_expires = match get("S3_PRESIGN_EXPIRES") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber("S3_PRESIGN_EXPIRES", raw))?,
            None => defaults.storage.presign_expires,
        };

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };

        let config = AppConfig {
            server: ServerSettings {
                port,
                database_url: get("DATABASE_URL").or(defaults.server.database_url),
                base_url: get("BASE_URL").unwrap_or(defaults.server.base_url),
                front_base_url: get("FRONT_BASE_URL").unwrap_or(defaults.server.front_base_url),
            },
            openai: OpenAiSettings {
                api_key: get("OPENAI_API_KEY"),
                base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
                model: get("OPENAI_MODEL").unwrap_or(defaults.openai.model),
                rate_limit_wait_secs,
            },
            storage: StorageSettings {
                endpoint: get("S3_ENDPOINT").unwrap_or(defaults.storage.endpoint),
                bucket: get("S3_BUCKET").unwrap_or(defaults.storage.bucket),
                region: get("S3_REGION").unwrap_or(defaults.storage.region),
                access_key: get("S3_ACCESS_KEY"),
                secret_key: get("S3_SECRET_KEY"),
                presign_expires,
            },
            instagram: InstagramSettings {
                graph_base: get("IG_GRAPH_BASE").unwrap_or(defaults.instagram.graph_base),
                user_id: get("IG_USER_ID"),
                access_token: get("IG_ACCESS_TOKEN"),
            },
            toss: TossSettings {
                api_base: get("TOSS_API_BASE").unwrap_or(defaults.toss.api_base),
                secret_key: get("TOSS_SECRET_KEY"),
            },
            nts: NtsSettings {
                api_base: get("NTS_API_BASE").unwrap_or(defaults.nts.api_base),
                api_key: get("NTS_API_KEY"),
                validate: get("NTS_VALIDATE")
                    .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                    .unwrap_or(true),
            },
            card: CardSettings {
                font_path: get("CARD_FONT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.card.font_path),
                background_key: get("CARD_BACKGROUND_KEY").unwrap_or(defaults.card.background_key),
                district_color: get("CARD_DISTRICT_COLOR").unwrap_or(defaults.card.district_color),
            },
            admin,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [
            &self.server.base_url,
            &self.server.front_base_url,
            &self.openai.base_url,
            &self.storage.endpoint,
            &self.instagram.graph_base,
            &self.toss.api_base,
            &self.nts.api_base,
        ] {
            reqwest::Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.clone()))?;
        }
        if self.storage.bucket.is_empty() {
            return Err(ConfigError::MissingValue("S3_BUCKET"));
        }
        self.card.district_rgb()?;
        Ok(())
    }
}

fn parse_hex_color(raw: &str) -> Result<[u8; 3], ConfigError> {
    let hex = raw
        .strip_prefix('#')
        .filter(|h| h.len() == 6 && h.is_ascii())
        .ok_or_else(|| ConfigError::InvalidColor(raw.to_string()))?;
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| ConfigError::InvalidColor(raw.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid colour (expected #RRGGBB): {0}")]
    InvalidColor(String),
}
